// @awa-component: EMB-ProviderRegistry
//
//! Provider registry and routing policy.
//!
//! Loaded once at startup from a JSON file (or from env vars for
//! dev/offline use) and validated before the service starts. Validation
//! failures are startup errors, not runtime errors.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors raised while loading or validating provider configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read provider config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse provider config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No enabled embedding providers configured")]
    NoEnabledProviders,

    #[error("Policy references unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider '{0}' requires an API key")]
    MissingApiKey(String),

    #[error("Provider '{name}' has an invalid endpoint: {url}")]
    InvalidEndpoint { name: String, url: String },
}

/// Backend kind tag, fixed at configuration-load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    Local,
}

/// Candidate-ordering strategy for the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStrategy {
    /// Ascending priority number; ties broken by configuration order.
    #[default]
    Priority,
    /// Rotating cursor over the enabled set; each request starts one
    /// position further along.
    RoundRobin,
}

/// One configured embedding backend. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint override; each kind has a sensible default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub default_embedding_model: String,
    /// Vector dimensionality produced by the default model.
    pub dimensions: usize,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Lower is preferred.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

/// Global routing policy. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersPolicy {
    /// Name of the provider used when no override applies.
    pub default_provider: String,
    /// Embedding-specific provider override; validated but ordering stays
    /// strategy-driven.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,
    #[serde(default)]
    pub selection_strategy: SelectionStrategy,
    /// When false, only the first candidate is ever attempted.
    #[serde(default = "default_true")]
    pub enable_fallback: bool,
    /// Attempts per candidate (total, not extra retries).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed delay between attempts. No implicit backoff growth.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

/// On-disk configuration: policy plus provider list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(flatten)]
    pub policy: ProvidersPolicy,
    pub providers: Vec<ProviderConfig>,
}

impl RegistryConfig {
    /// Load from a JSON file. Missing OpenAI keys fall back to
    /// `OPENAI_API_KEY` so secrets can stay out of the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&raw)?;

        for provider in &mut config.providers {
            if provider.kind == ProviderKind::OpenAi && provider.api_key.is_none() {
                provider.api_key = env::var("OPENAI_API_KEY").ok();
            }
        }

        Ok(config)
    }

    /// Env-only configuration for dev/CLI use — no file required.
    ///
    /// Picks `openai` when `OPENAI_API_KEY` is set (unless
    /// `EMBEDDING_PROVIDER` says otherwise), `local` as the offline
    /// default.
    pub fn from_env() -> Self {
        let openai_api_key = env::var("OPENAI_API_KEY").ok();
        let provider = env::var("EMBEDDING_PROVIDER").ok().unwrap_or_else(|| {
            if openai_api_key.is_some() {
                "openai".to_string()
            } else {
                "local".to_string()
            }
        });

        let config = match provider.as_str() {
            "openai" => ProviderConfig {
                kind: ProviderKind::OpenAi,
                name: "openai".to_string(),
                api_key: openai_api_key,
                endpoint: None,
                default_embedding_model: env::var("EMBEDDING_ACTIVE_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                dimensions: 1536,
                is_enabled: true,
                priority: 1,
            },
            "ollama" => ProviderConfig {
                kind: ProviderKind::Ollama,
                name: "ollama".to_string(),
                api_key: None,
                endpoint: env::var("OLLAMA_BASE_URL").ok(),
                default_embedding_model: env::var("EMBEDDING_ACTIVE_MODEL")
                    .unwrap_or_else(|_| "nomic-embed-text".to_string()),
                dimensions: 768,
                is_enabled: true,
                priority: 1,
            },
            _ => ProviderConfig {
                kind: ProviderKind::Local,
                name: "local".to_string(),
                api_key: None,
                endpoint: None,
                default_embedding_model: "local-fnv".to_string(),
                dimensions: 768,
                is_enabled: true,
                priority: 1,
            },
        };

        Self {
            policy: ProvidersPolicy {
                default_provider: config.name.clone(),
                embedding_provider: None,
                selection_strategy: SelectionStrategy::Priority,
                enable_fallback: true,
                retry_attempts: default_retry_attempts(),
                retry_delay_ms: default_retry_delay_ms(),
            },
            providers: vec![config],
        }
    }

    /// Single offline provider — used by tests and local development.
    pub fn local_only() -> Self {
        let mut config = Self::from_env();
        config.providers = vec![ProviderConfig {
            kind: ProviderKind::Local,
            name: "local".to_string(),
            api_key: None,
            endpoint: None,
            default_embedding_model: "local-fnv".to_string(),
            dimensions: 768,
            is_enabled: true,
            priority: 1,
        }];
        config.policy.default_provider = "local".to_string();
        config.policy.embedding_provider = None;
        config
    }
}

/// The validated, immutable set of configured backends plus policy.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderConfig>,
    policy: ProvidersPolicy,
}

impl ProviderRegistry {
    /// Validate and freeze a loaded configuration.
    ///
    /// Fails fast when the enabled set is empty, when the policy names an
    /// unknown provider, when an enabled OpenAI provider lacks an API key,
    /// or when an endpoint override is not a valid URL.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        let RegistryConfig { policy, providers } = config;

        if !providers.iter().any(|p| p.is_enabled) {
            return Err(ConfigError::NoEnabledProviders);
        }

        let known = |name: &str| providers.iter().any(|p| p.name == name);
        if !known(&policy.default_provider) {
            return Err(ConfigError::UnknownProvider(policy.default_provider.clone()));
        }
        if let Some(name) = &policy.embedding_provider
            && !known(name)
        {
            return Err(ConfigError::UnknownProvider(name.clone()));
        }

        for provider in providers.iter().filter(|p| p.is_enabled) {
            if provider.kind == ProviderKind::OpenAi && provider.api_key.is_none() {
                return Err(ConfigError::MissingApiKey(provider.name.clone()));
            }
            if let Some(endpoint) = &provider.endpoint
                && Url::parse(endpoint).is_err()
            {
                return Err(ConfigError::InvalidEndpoint {
                    name: provider.name.clone(),
                    url: endpoint.clone(),
                });
            }
        }

        Ok(Self { providers, policy })
    }

    pub fn policy(&self) -> &ProvidersPolicy {
        &self.policy
    }

    /// Enabled providers sorted by ascending priority. The sort is stable,
    /// so configuration order breaks ties.
    pub fn enabled_providers(&self) -> Vec<&ProviderConfig> {
        let mut enabled: Vec<&ProviderConfig> =
            self.providers.iter().filter(|p| p.is_enabled).collect();
        enabled.sort_by_key(|p| p.priority);
        enabled
    }
}
