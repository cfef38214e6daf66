// @awa-component: EMB-ProviderSelector
//
//! Candidate ordering over the enabled providers.
//!
//! Built once from a validated registry. `Priority` keeps the registry's
//! ascending-priority order; `RoundRobin` rotates a process-wide cursor so
//! different requests get a different first try while every enabled
//! provider remains available as fallback.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{ProviderRegistry, SelectionStrategy};

use super::EmbeddingError;
use super::backend::{EmbeddingBackend, create_backend};

/// An instantiated provider: configuration identity plus backend client.
#[derive(Clone)]
pub struct ProviderHandle {
    pub name: String,
    pub priority: u32,
    pub backend: Arc<dyn EmbeddingBackend>,
}

pub struct ProviderSelector {
    /// Sorted ascending by priority, configuration order breaking ties.
    handles: Vec<ProviderHandle>,
    strategy: SelectionStrategy,
    enable_fallback: bool,
    cursor: AtomicUsize,
}

impl ProviderSelector {
    /// Instantiate one backend per enabled provider in the registry.
    pub fn from_registry(registry: &ProviderRegistry) -> Result<Self, EmbeddingError> {
        let mut handles = Vec::new();
        for config in registry.enabled_providers() {
            handles.push(ProviderHandle {
                name: config.name.clone(),
                priority: config.priority,
                backend: create_backend(config)?,
            });
        }
        Ok(Self::new(
            handles,
            registry.policy().selection_strategy,
            registry.policy().enable_fallback,
        ))
    }

    /// Build from pre-instantiated handles. Tests use this with mocks.
    pub fn new(
        mut handles: Vec<ProviderHandle>,
        strategy: SelectionStrategy,
        enable_fallback: bool,
    ) -> Self {
        handles.sort_by_key(|h| h.priority);
        Self {
            handles,
            strategy,
            enable_fallback,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Ordered candidate list for one request.
    ///
    /// With fallback disabled only the first candidate is returned; the
    /// governor then applies same-provider retries only.
    pub fn candidates(&self) -> Vec<ProviderHandle> {
        if self.handles.is_empty() {
            return Vec::new();
        }

        let ordered: Vec<ProviderHandle> = match self.strategy {
            SelectionStrategy::Priority => self.handles.clone(),
            SelectionStrategy::RoundRobin => {
                let start = self.cursor.fetch_add(1, Ordering::Relaxed) % self.handles.len();
                self.handles
                    .iter()
                    .cloned()
                    .cycle()
                    .skip(start)
                    .take(self.handles.len())
                    .collect()
            }
        };

        if self.enable_fallback {
            ordered
        } else {
            ordered.into_iter().take(1).collect()
        }
    }

    /// Dimensionality of the primary (lowest-priority-number) backend.
    /// Zero-vector placeholders are sized from this.
    pub fn primary_dimensions(&self) -> usize {
        self.handles
            .first()
            .map(|h| h.backend.dimensions())
            .unwrap_or(0)
    }

    /// Model identifier of the primary backend.
    pub fn primary_model(&self) -> String {
        self.handles
            .first()
            .map(|h| h.backend.model().to_string())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
