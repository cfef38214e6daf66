//! API server configuration.

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3200").
    pub bind_addr: String,
    /// Path to the providers JSON config; `None` means env-based config.
    pub providers_path: Option<String>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable          | Default          |
    /// |-------------------|------------------|
    /// | `BIND_ADDR`       | `127.0.0.1:3200` |
    /// | `PACTA_PROVIDERS` | unset            |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3200".into()),
            providers_path: std::env::var("PACTA_PROVIDERS").ok(),
        }
    }
}
