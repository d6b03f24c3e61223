use anyhow::{bail, Context, Result};
use cms_sync::config::SyncCliConfig;
use cms_sync::host::{PluginMode, StaticHost};
use cms_sync::{
    configure_and_sync, sync_existing_collection, DataSourceAdapter, PinterestAdapter,
    PreviousSync, RelayClient, SqliteCollection,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const USAGE: &str = "usage: cms-sync login\n       cms-sync resume\n       cms-sync sync <board_id> <slug_field_id> [<access_token>]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_sync=info".into()),
        )
        .init();

    let config = SyncCliConfig::from_env();
    info!(
        db_path = %config.db_path,
        api_url = %config.api_url,
        relay_url = %config.relay_url,
        "Configuration loaded"
    );

    let collection =
        SqliteCollection::new(&config.db_path).context("Failed to open collection database")?;
    let adapter = PinterestAdapter::with_base_url(config.api_url.clone());

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c_token.cancel();
        }
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("login") => {
            let token = login(&config.relay_url, &cancel).await?;
            println!("{}", token);
        }
        Some("resume") => {
            let previous = PreviousSync::load(&collection).await?;
            let host = StaticHost::permissive(PluginMode::SyncManagedCollection);
            let outcome =
                sync_existing_collection(&host, &collection, &adapter, &previous, &cancel).await;

            match outcome.report {
                Some(report) => info!(
                    removed = report.removed.len(),
                    upserted = report.upserted.len(),
                    skipped = report.skipped.len(),
                    "Collection resynced"
                ),
                None => info!("Nothing to resync"),
            }
        }
        Some("sync") if args.len() == 3 || args.len() == 4 => {
            let board_id = &args[1];
            let slug_field_id = &args[2];

            let access_token = match args.get(3) {
                Some(token) => token.clone(),
                None => login(&config.relay_url, &cancel).await?,
            };

            let source = adapter.fetch(board_id, &access_token, &cancel).await?;
            let report =
                configure_and_sync(&collection, &source, None, slug_field_id, &access_token)
                    .await?;

            info!(
                board_id = %board_id,
                removed = report.removed.len(),
                upserted = report.upserted.len(),
                skipped = report.skipped.len(),
                "Collection synced"
            );
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

/// Run the relay handshake and wait for the user to authorize.
async fn login(relay_url: &str, cancel: &CancellationToken) -> Result<String> {
    let relay = RelayClient::new(relay_url.to_string());
    let handoff = relay.authorize().await?;

    println!("Open this URL to authorize access to your boards:\n\n  {}\n", handoff.url);

    let token = relay.wait_for_token(&handoff.read_key, cancel).await?;
    Ok(token)
}
