//! High-level runtime orchestrator.
//!
//! The runtime wires the zone registry, the scheduler and the tick driver
//! together, and exposes a builder-based API so hosts inject their facades
//! explicitly instead of reaching for a global instance.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use zone_core::{IntegrationSettings, RewardSettings, Settings};

use crate::api::{
    FacadeKind, FarmingFacade, PlayerDirectory, PresentationFacade, Result, RuntimeError,
    RuntimeHandle,
};
use crate::capabilities::{Capabilities, IntegrationProbe};
use crate::events::{Event, EventBus, Topic};
use crate::scheduler::{Facades, WorkerScheduler};
use crate::workers::{HarvestMetrics, TickWorker};
use crate::zones::ZoneRegistry;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub rewards: RewardSettings,
    pub integrations: IntegrationSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for RuntimeConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            tick_interval: Duration::from_millis(settings.tick_interval_ms),
            event_buffer_size: settings.event_buffer_size,
            rewards: settings.rewards.clone(),
            integrations: settings.integrations.clone(),
        }
    }
}

/// Main runtime that drives AFK zone workers.
///
/// Design: Runtime owns the tick driver. [`RuntimeHandle`] provides a
/// cloneable façade for hosts and event listeners.
pub struct Runtime {
    handle: RuntimeHandle,
    ticker_handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to runtime events on one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Stops the tick driver, then force-removes every worker.
    ///
    /// Workers are drained even when the tick driver died; its join error is
    /// reported afterwards.
    pub async fn shutdown(self) -> Result<()> {
        // A send error means the ticker already exited.
        let _ = self.shutdown_tx.send(true);
        let joined = self.ticker_handle.await;

        self.handle.scheduler().shutdown();
        joined.map_err(RuntimeError::TickerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    zones: Option<Arc<ZoneRegistry>>,
    farming: Option<Arc<dyn FarmingFacade>>,
    presentation: Option<Arc<dyn PresentationFacade>>,
    players: Option<Arc<dyn PlayerDirectory>>,
    probes: Vec<Box<dyn IntegrationProbe>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            zones: None,
            farming: None,
            presentation: None,
            players: None,
            probes: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a pre-loaded zone registry. Defaults to an empty one.
    pub fn zones(mut self, zones: Arc<ZoneRegistry>) -> Self {
        self.zones = Some(zones);
        self
    }

    /// Set the farming facade (required)
    pub fn farming(mut self, facade: Arc<dyn FarmingFacade>) -> Self {
        self.farming = Some(facade);
        self
    }

    /// Set the presentation facade (required)
    pub fn presentation(mut self, facade: Arc<dyn PresentationFacade>) -> Self {
        self.presentation = Some(facade);
        self
    }

    /// Set the player directory (required)
    pub fn players(mut self, directory: Arc<dyn PlayerDirectory>) -> Self {
        self.players = Some(directory);
        self
    }

    /// Register an integration probe, evaluated once during [`build`](Self::build).
    pub fn probe(mut self, probe: impl IntegrationProbe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Assembles the runtime and starts the tick driver on the current Tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let RuntimeBuilder {
            config,
            zones,
            farming,
            presentation,
            players,
            probes,
        } = self;

        if config.tick_interval.is_zero() {
            return Err(RuntimeError::ZeroTickInterval);
        }

        let facades = Facades {
            farming: farming.ok_or(RuntimeError::FacadeNotSet {
                kind: FacadeKind::Farming,
            })?,
            presentation: presentation.ok_or(RuntimeError::FacadeNotSet {
                kind: FacadeKind::Presentation,
            })?,
            players: players.ok_or(RuntimeError::FacadeNotSet {
                kind: FacadeKind::Players,
            })?,
        };

        let capabilities = Capabilities::negotiate(&config.integrations, &probes);
        let zones = zones.unwrap_or_default();
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let metrics = Arc::new(HarvestMetrics::new());

        let scheduler = WorkerScheduler::new(
            Arc::clone(&zones),
            facades,
            event_bus.clone(),
            Arc::clone(&metrics),
            config.rewards.clone(),
            Handle::current(),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ticker = TickWorker::new(Arc::clone(&scheduler), config.tick_interval, shutdown_rx);
        let ticker_handle = tokio::spawn(ticker.run());

        tracing::info!(
            target: "runtime",
            zones = zones.len(),
            tick_ms = config.tick_interval.as_millis() as u64,
            capabilities = ?capabilities,
            "Runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(scheduler, event_bus, capabilities),
            ticker_handle,
            shutdown_tx,
        })
    }
}
