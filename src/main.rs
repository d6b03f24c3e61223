use anyhow::{Context, Result};
use pinsync::config::{load_config, RelayConfig};
use pinsync::relay::{create_relay_router, HandoffManager, OAuthProvider, RelayAppState};
use pinsync::store::{run_store_cleanup, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinsync=info".into()),
        )
        .init();

    info!("OAuth relay starting...");

    // Config file is optional; secrets always come from the environment
    let config_path =
        std::env::var("PINSYNC_CONFIG").unwrap_or_else(|_| "pinsync.toml".to_string());
    let mut config = if std::path::Path::new(&config_path).exists() {
        load_config(&config_path)?
    } else {
        info!(path = %config_path, "Config file not found, using defaults");
        RelayConfig::default()
    };
    config.apply_env()?;

    info!(
        bind_address = %config.server.bind_address,
        plugin_uri = %config.pinterest.plugin_uri,
        ttl_seconds = config.handoff.ttl_seconds,
        "Configuration loaded"
    );

    let store = MemoryStore::new();
    tokio::spawn(run_store_cleanup(
        store.clone(),
        config.handoff.cleanup_interval_seconds,
    ));

    let state = RelayAppState {
        handoffs: HandoffManager::new(
            Arc::new(store),
            Duration::from_secs(config.handoff.ttl_seconds),
        ),
        provider: OAuthProvider::from(&config.pinterest),
        http_client: reqwest::Client::new(),
    };
    let router = create_relay_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(address = %config.server.bind_address, "OAuth relay listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Relay server error")?;

    info!("OAuth relay stopped");
    Ok(())
}
