use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vmm_client::config::{load_config, validate_config};
use vmm_client::provider::SystemLoader;
use vmm_client::workload;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("loading configuration")?;
    validate_config(&config).context("validating configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting vmm-client v{}", env!("CARGO_PKG_VERSION"));
    info!("Architecture: {}", std::env::consts::ARCH);

    let stop = Arc::new(AtomicBool::new(false));
    let ctrl_c_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, finishing the current batch");
            ctrl_c_stop.store(true, Ordering::SeqCst);
        }
    });

    let summary = tokio::task::spawn_blocking(move || workload::run(&SystemLoader, &config, &stop))
        .await
        .context("read workload panicked")??;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!("done");
    Ok(())
}
