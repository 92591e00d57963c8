mod render;

use channel_loader::{ChannelDataLoader, ChannelDataService, LoaderConfig, TracingProgress};
use datastore::InMemorySnapshotStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();

    match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing().map_err(|e| format!("tracing init failed: {e}"))?;

    let config = LoaderConfig::from_env()?;
    let refresh = config.refresh;
    let loader = ChannelDataLoader::from_config(config)?.with_progress(Arc::new(TracingProgress));
    let service = Arc::new(ChannelDataService::new(
        loader,
        Arc::new(InMemorySnapshotStore::new()),
    ));

    let mut snapshots = service.subscribe();
    let renderer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                println!("{}", render::page(&snapshot));
            }
        }
    });

    service.start().await;

    let auto_refresh = if refresh.enabled {
        Some(service.clone().spawn_auto_refresh())
    } else {
        info!("automatic refresh disabled");
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    if let Some(handle) = auto_refresh {
        handle.abort();
    }
    renderer.abort();
    if let Err(e) = renderer.await {
        if !e.is_cancelled() {
            warn!(error = %e, "renderer task failed");
        }
    }
    Ok(())
}
