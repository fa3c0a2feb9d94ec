//! AFK zone daemon.
//!
//! Composition root that assembles:
//! 1. Settings and the zone catalog (zone-content loaders)
//! 2. The zone registry and runtime (scheduler + tick driver)
//! 3. In-process facades standing in for the host
//!
//! Runs until Ctrl-C, then stops the tick driver and drains every worker.
//!
//! ```bash
//! AFKZONE_ZONES=crates/daemon/config/zones.toml AFKZONE_DEMO_PLAYERS=3 cargo run -p afkzone-daemon
//! ```

mod config;
mod demo;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use runtime::sim::{SimFarming, SimPlayers, SimPresentation};
use runtime::{Runtime, RuntimeConfig, ZoneRegistry};
use zone_content::{SettingsLoader, ZoneCatalog, ZoneLoader};
use zone_core::Settings;

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // 1. Configuration
    let config = DaemonConfig::from_env();
    let settings = load_settings(&config)?;

    // 2. Logging
    logging::setup_logging(config.session_id.as_deref(), config.log_dir.clone(), settings.debug)?;
    tracing::info!("Starting afkzoned");
    tracing::info!("Settings: {}", config.settings_path.display());
    tracing::info!("Tick interval: {}ms", settings.tick_interval_ms);

    // 3. Zones
    let catalog = load_catalog(&config.zones_path)?;
    for rejected in &catalog.rejected {
        tracing::error!(zone = %rejected.id, "Rejected zone entry: {}", rejected.reason);
    }
    let zones = Arc::new(ZoneRegistry::new());
    let report = zones.load(catalog.definitions);
    tracing::info!(
        "Zones ready: {} loaded, {} skipped",
        report.loaded,
        report.skipped.len() + catalog.rejected.len()
    );

    // 4. Runtime
    let players = Arc::new(SimPlayers::new());
    let runtime = Runtime::builder()
        .config(RuntimeConfig::from(&settings))
        .zones(zones)
        .farming(Arc::new(SimFarming::new(Arc::clone(&players))))
        .presentation(Arc::new(SimPresentation::new()))
        .players(players.clone())
        .build()
        .await?;
    let handle = runtime.handle();

    let logger = demo::spawn_event_logger(&handle);

    if config.demo_players > 0 {
        let joined = demo::join_demo_players(&handle, &players, config.demo_players);
        tracing::info!("{} of {} demo players joined", joined, config.demo_players);
    }

    // 5. Run until interrupted
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    runtime.shutdown().await?;
    logger.abort();

    let metrics = handle.metrics();
    tracing::info!(
        "Harvests: {} dispatched, {} succeeded, {} failed, {} discarded",
        metrics.dispatched,
        metrics.succeeded,
        metrics.failed,
        metrics.discarded
    );
    tracing::info!("afkzoned stopped");
    Ok(())
}

fn load_settings(config: &DaemonConfig) -> Result<Settings> {
    let mut settings = SettingsLoader::load_or_default(&config.settings_path)
        .with_context(|| format!("Failed to load settings from {}", config.settings_path.display()))?;

    if let Some(ms) = config.tick_interval_ms {
        settings.tick_interval_ms = ms;
    }
    if let Some(debug) = config.debug {
        settings.debug = debug;
    }
    Ok(settings)
}

fn load_catalog(path: &Path) -> Result<ZoneCatalog> {
    if !path.exists() {
        tracing::warn!("Zone catalog {} not found, starting with no zones", path.display());
        return Ok(ZoneCatalog::default());
    }
    ZoneLoader::load(path).with_context(|| format!("Failed to load zones from {}", path.display()))
}
