//! Domain models shared across the embedding core and the API surface.

pub mod chunk;
pub mod embedding;
pub mod status;
