//! Cloneable façade over the running scheduler.
//!
//! [`RuntimeHandle`] is what hosts keep around: event listeners call into the
//! join gate, admin tooling reloads or disables zones, and presentation
//! collaborators subscribe to event topics.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use zone_core::{Location, PlayerId, WorkerId, ZoneDefinition, ZoneId};

use crate::capabilities::Capabilities;
use crate::events::{Event, EventBus, RemovalReason, Topic};
use crate::gate::JoinGate;
use crate::scheduler::{Worker, WorkerScheduler};
use crate::workers::MetricsSnapshot;
use crate::zones::{LoadReport, ZoneRegistry};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    scheduler: Arc<WorkerScheduler>,
    event_bus: EventBus,
    capabilities: Capabilities,
}

impl RuntimeHandle {
    pub(crate) fn new(
        scheduler: Arc<WorkerScheduler>,
        event_bus: EventBus,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            scheduler,
            event_bus,
            capabilities,
        }
    }

    pub fn scheduler(&self) -> &Arc<WorkerScheduler> {
        &self.scheduler
    }

    pub fn zones(&self) -> &Arc<ZoneRegistry> {
        self.scheduler.zones()
    }

    /// Join preconditions for player-triggered actions.
    pub fn gate(&self) -> JoinGate {
        JoinGate::new(Arc::clone(&self.scheduler))
    }

    /// Integrations negotiated at startup.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.scheduler.metrics().snapshot()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Worker` - Worker created, activated, removed
    /// - `Topic::Harvest` - Harvest dispatched, completed, failed
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Creates a worker without join preconditions. `None` when the zone is
    /// unknown or full.
    pub fn create_worker(&self, player: PlayerId, zone: &ZoneId) -> Option<Arc<Worker>> {
        let zone = self.zones().get(zone)?;
        self.scheduler.create_worker(player, &zone)
    }

    pub fn remove_worker(&self, id: WorkerId) -> bool {
        self.scheduler.remove_worker(id)
    }

    pub fn remove_player_workers(&self, player: PlayerId) -> usize {
        self.scheduler
            .remove_player_workers(player, RemovalReason::Requested)
    }

    pub fn remove_zone_workers(&self, zone: &ZoneId) -> usize {
        self.scheduler
            .remove_zone_workers(zone, RemovalReason::Requested)
    }

    pub fn get_worker(&self, id: WorkerId) -> Option<Arc<Worker>> {
        self.scheduler.get_worker(id)
    }

    pub fn get_worker_by_player(&self, player: PlayerId) -> Option<Arc<Worker>> {
        self.scheduler.get_worker_by_player(player)
    }

    pub fn get_player_workers(&self, player: PlayerId) -> Vec<Arc<Worker>> {
        self.scheduler.get_player_workers(player)
    }

    pub fn get_zone_workers(&self, zone: &ZoneId) -> Vec<Arc<Worker>> {
        self.scheduler.get_zone_workers(zone)
    }

    pub fn get_all_workers(&self) -> Vec<Arc<Worker>> {
        self.scheduler.get_all_workers()
    }

    pub fn time_until_next_harvest(&self, id: WorkerId) -> Option<Duration> {
        self.scheduler.time_until_next_harvest(id, Instant::now())
    }

    pub fn contains_location(&self, zone: &ZoneId, point: &Location) -> bool {
        self.zones().contains_location(zone, point)
    }

    /// Replaces the zone set and removes workers of zones that vanished or
    /// came back disabled.
    pub fn reload_zones(&self, definitions: impl IntoIterator<Item = ZoneDefinition>) -> LoadReport {
        let report = self.zones().load(definitions);
        let pruned = self.scheduler.prune_stale_zones();
        if pruned > 0 {
            tracing::info!(target: "runtime", pruned, "Removed workers of stale zones");
        }
        report
    }

    /// Disables a zone and removes its workers. False when the zone is unknown.
    pub fn disable_zone(&self, zone: &ZoneId) -> bool {
        if !self.zones().set_enabled(zone, false) {
            return false;
        }
        self.scheduler
            .remove_zone_workers(zone, RemovalReason::ZoneDisabled);
        true
    }

    pub fn enable_zone(&self, zone: &ZoneId) -> bool {
        self.zones().set_enabled(zone, true)
    }
}
