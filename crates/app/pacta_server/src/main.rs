//! Pacta embedding service binary.
//!
//! Loads the provider registry, wires the HTTP API and serves it until
//! Ctrl-C, cancelling in-flight background pipelines on shutdown.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use pacta_core::config::{ProviderRegistry, RegistryConfig};
use pacta_core::store::{InMemoryVectorStore, VectorStore};

/// CLI arguments for the embedding service.
#[derive(Parser, Debug)]
#[command(name = "pacta_server", about = "Pacta embedding service")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PACTA_PORT", default_value_t = 3200)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "PACTA_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Path to a providers JSON file. When absent the registry is built
    /// from environment variables.
    #[arg(long, env = "PACTA_PROVIDERS")]
    providers: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pacta_api=debug,pacta_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let registry_config = match &args.providers {
        Some(path) => {
            info!(path = %path, "loading provider registry from file");
            RegistryConfig::from_file(path)?
        }
        None => {
            info!("building provider registry from environment");
            RegistryConfig::from_env()
        }
    };

    // Fail fast on a misconfigured registry before binding the socket.
    let registry = ProviderRegistry::new(registry_config)?;
    for provider in registry.enabled_providers() {
        info!(
            provider = %provider.name,
            model = %provider.default_embedding_model,
            dimensions = provider.dimensions,
            "provider enabled"
        );
    }

    let config = pacta_api::config::ApiConfig {
        bind_addr: format!("{}:{}", args.bind, args.port),
        providers_path: args.providers.clone(),
    };

    let shutdown = CancellationToken::new();
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let state = pacta_api::AppState::build(&registry, store, config.clone(), shutdown.clone())?;

    let app = pacta_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "embedding API listening");

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            ctrl_c_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .await?;

    info!("server stopped");
    Ok(())
}
