//! Automation controller server
//!
//! Main entry point: loads settings, boots the store from storage, starts
//! the tick runtime and serves the configuration API.

use anyhow::{Context, Result};
use at_automation::{SimulatedIo, SystemClock};
use at_config::{load_or_initialize, BootSource, FileStorage, ServerSettings};
use at_server::{create_router, start_server, AppState, TickRuntime};
use at_store::AutomationStore;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting automation controller");

    let settings = ServerSettings::from_env().context("invalid server settings")?;
    let listen = settings.listen_addr()?.to_string();

    let storage = Arc::new(FileStorage::new(&settings.storage_path));
    let mut store = AutomationStore::with_defaults();
    match load_or_initialize(&mut store, storage.as_ref()).await {
        BootSource::Stored(report) => info!(
            path = ?settings.storage_path,
            valid = report.valid_json,
            "Configuration restored"
        ),
        BootSource::Defaults => info!(path = ?settings.storage_path, "Running on defaults"),
    }
    info!(
        device = %store.device.device_name,
        run = store.device.run,
        "Controller initialized"
    );
    let store = at_store::shared(store);

    // No GPIO driver is linked into this binary; pins are simulated
    let runtime = TickRuntime::new(
        store.clone(),
        Arc::new(SimulatedIo::new()),
        Arc::new(SystemClock::new()),
        settings.tick_interval(),
    );
    let ticker = runtime.start();

    let state = AppState::new(store, storage.clone());
    let router = create_router(state, settings.web_root.as_deref());
    let server = tokio::spawn(async move {
        if let Err(err) = start_server(router, &listen).await {
            error!(%err, "API server failed");
        }
    });

    info!("Automation controller is running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    runtime.stop();
    if let Some(ticker) = ticker {
        ticker.await?;
    }
    server.abort();

    Ok(())
}
