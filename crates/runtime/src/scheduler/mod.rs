//! Worker scheduler: owns every live worker and drives their harvests.
//!
//! Mutations come from two directions. Joins, leaves, disconnects and admin
//! actions call in from arbitrary tasks; the tick driver scans a snapshot of
//! the active workers on its own period. Both go through [`WorkerIndex`],
//! whose lock covers map operations only. External calls always happen in
//! spawned tasks.

mod harvest;
mod index;
mod worker;

pub use harvest::RewardSummary;

use harvest::HarvestSlot;
pub use index::{Reservation, WorkerIndex};
pub use worker::{Worker, WorkerPhase, WorkerSnapshot};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use zone_core::{PlayerId, RewardSettings, ToolId, WorkerId, Zone, ZoneId};

use crate::api::{
    FarmingFacade, HarvestFlags, HarvestRequest, PlayerDirectory, PresentationFacade,
    ResourceHandle, SessionMode, WorkerEntitySpec,
};
use crate::events::{EventBus, HarvestEvent, RemovalReason, WorkerEvent};
use crate::workers::HarvestMetrics;
use crate::zones::ZoneRegistry;

/// External collaborators the scheduler calls into.
#[derive(Clone)]
pub struct Facades {
    pub farming: Arc<dyn FarmingFacade>,
    pub presentation: Arc<dyn PresentationFacade>,
    pub players: Arc<dyn PlayerDirectory>,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Active workers inspected.
    pub scanned: usize,
    pub dispatched: usize,
    pub removed: usize,
    /// Workers skipped because a facade panicked.
    pub panicked: usize,
}

enum TickOutcome {
    Skipped,
    Dispatched,
    Removed,
}

pub struct WorkerScheduler {
    zones: Arc<ZoneRegistry>,
    index: WorkerIndex,
    facades: Facades,
    events: EventBus,
    metrics: Arc<HarvestMetrics>,
    rewards: RewardSettings,
    next_id: AtomicU64,
    runtime: Handle,
    closed: AtomicBool,
}

impl WorkerScheduler {
    /// Creates a scheduler whose background tasks run on `runtime`.
    pub fn new(
        zones: Arc<ZoneRegistry>,
        facades: Facades,
        events: EventBus,
        metrics: Arc<HarvestMetrics>,
        rewards: RewardSettings,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            zones,
            index: WorkerIndex::new(),
            facades,
            events,
            metrics,
            rewards,
            next_id: AtomicU64::new(1),
            runtime,
            closed: AtomicBool::new(false),
        })
    }

    pub fn zones(&self) -> &Arc<ZoneRegistry> {
        &self.zones
    }

    pub fn facades(&self) -> &Facades {
        &self.facades
    }

    pub fn metrics(&self) -> &Arc<HarvestMetrics> {
        &self.metrics
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Creates (or returns the existing) worker for `player` in `zone`.
    ///
    /// Returns `None` when the zone is at capacity or the scheduler has shut
    /// down. A new worker starts pending and is scheduled only once its
    /// presentation entity attaches.
    pub fn create_worker(self: &Arc<Self>, player: PlayerId, zone: &Zone) -> Option<Arc<Worker>> {
        if self.is_closed() {
            warn!(target: "runtime::scheduler", player = %player, "Scheduler closed, refusing worker");
            return None;
        }

        let worker = match self.index.reserve(player, &zone.id, zone.max_workers, || {
            let id = WorkerId(self.next_id.fetch_add(1, Ordering::Relaxed));
            Worker::new(id, player, zone.id.clone(), Instant::now())
        }) {
            Reservation::Existing(worker) => return Some(worker),
            Reservation::Full => {
                debug!(
                    target: "runtime::scheduler",
                    player = %player,
                    zone = %zone.id,
                    max_workers = zone.max_workers,
                    "Zone at capacity"
                );
                return None;
            }
            Reservation::Reserved(worker) => worker,
        };

        // A shutdown may have drained between the check above and the reservation.
        if self.is_closed() {
            self.remove_with_reason(worker.id(), RemovalReason::Shutdown);
            return None;
        }

        info!(
            target: "runtime::scheduler",
            worker = %worker.id(),
            player = %player,
            zone = %zone.id,
            "Worker created"
        );
        self.events.publish(WorkerEvent::Created {
            worker: worker.id(),
            player,
            zone: zone.id.clone(),
        });

        self.spawn_session_join(player, zone);

        if let Some(tool) = self.resolve_tool(player) {
            worker.cache_tool(tool);
        }

        self.spawn_attach(&worker, zone);
        Some(worker)
    }

    fn spawn_session_join(&self, player: PlayerId, zone: &Zone) {
        let farming = Arc::clone(&self.facades.farming);
        let zone_id = zone.id.clone();
        let mode = if zone.uses_global_session() {
            SessionMode::Global
        } else {
            SessionMode::Alone
        };

        self.runtime.spawn(async move {
            if let Err(error) = farming.join_session(player, &zone_id, mode).await {
                warn!(
                    target: "runtime::scheduler",
                    player = %player,
                    zone = %zone_id,
                    error = %error,
                    "Failed to join farming session"
                );
            }
        });
    }

    fn spawn_attach(self: &Arc<Self>, worker: &Worker, zone: &Zone) {
        let spec = WorkerEntitySpec {
            worker: worker.id(),
            owner: worker.owner(),
            zone: zone.id.clone(),
            entity_type: zone.worker_type.clone(),
            location: self
                .facades
                .players
                .location(worker.owner())
                .or_else(|| zone.anchor.clone()),
            display_name: self
                .facades
                .players
                .name(worker.owner())
                .map(|name| format!("{name}'s Worker"))
                .unwrap_or_else(|| "Worker".to_owned()),
        };
        let id = worker.id();
        let scheduler = Arc::clone(self);

        self.runtime.spawn(async move {
            match scheduler.facades.presentation.spawn_worker_entity(spec).await {
                Ok(handle) => scheduler.activate(id, handle),
                Err(error) => warn!(
                    target: "runtime::scheduler",
                    worker = %id,
                    error = %error,
                    "Worker entity failed to attach, worker stays pending"
                ),
            }
        });
    }

    fn activate(&self, id: WorkerId, handle: ResourceHandle) {
        match self.index.activate(id, handle) {
            Ok(_) if self.is_closed() => {
                debug!(
                    target: "runtime::scheduler",
                    worker = %id,
                    "Worker attached after shutdown, removing"
                );
                self.remove_with_reason(id, RemovalReason::Shutdown);
            }
            Ok(worker) => {
                info!(
                    target: "runtime::scheduler",
                    worker = %id,
                    zone = %worker.zone_id(),
                    "Worker activated"
                );
                self.events.publish(WorkerEvent::Activated {
                    worker: id,
                    player: worker.owner(),
                    zone: worker.zone_id().clone(),
                });
            }
            Err(handle) => {
                debug!(
                    target: "runtime::scheduler",
                    worker = %id,
                    "Worker removed before its entity attached, releasing"
                );
                self.facades.presentation.release(handle);
            }
        }
    }

    /// Held tool first, then the first recognized tool in the inventory.
    pub fn resolve_tool(&self, player: PlayerId) -> Option<ToolId> {
        let farming = &self.facades.farming;
        farming.resolve_tool_id(player).or_else(|| {
            self.facades
                .players
                .inventory(player)
                .iter()
                .find_map(|item| farming.tool_id_of(item))
        })
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Removes a worker on request. No-op for unknown or already removed ids.
    ///
    /// The player's farming session is left untouched so harvesting can be
    /// re-triggered without rejoining.
    pub fn remove_worker(&self, id: WorkerId) -> bool {
        self.remove_with_reason(id, RemovalReason::Requested)
    }

    pub fn remove_with_reason(&self, id: WorkerId, reason: RemovalReason) -> bool {
        let Some((worker, handle)) = self.index.remove(id) else {
            return false;
        };
        if let Some(handle) = handle {
            self.facades.presentation.release(handle);
        }

        info!(
            target: "runtime::scheduler",
            worker = %id,
            player = %worker.owner(),
            zone = %worker.zone_id(),
            reason = ?reason,
            harvests = worker.harvest_count(),
            "Worker removed"
        );
        self.events.publish(WorkerEvent::Removed {
            worker: id,
            player: worker.owner(),
            zone: worker.zone_id().clone(),
            reason,
        });
        true
    }

    /// Removes every worker owned by `player`. Returns how many were removed.
    pub fn remove_player_workers(&self, player: PlayerId, reason: RemovalReason) -> usize {
        self.index
            .by_player(player)
            .into_iter()
            .filter(|worker| self.remove_with_reason(worker.id(), reason))
            .count()
    }

    /// Removes every worker bound to `zone`, pending ones included.
    pub fn remove_zone_workers(&self, zone: &ZoneId, reason: RemovalReason) -> usize {
        self.index
            .ids_in_zone(zone)
            .into_iter()
            .filter(|id| self.remove_with_reason(*id, reason))
            .count()
    }

    /// Brings workers back in line with the current zone set. Used after a
    /// reload.
    ///
    /// Workers of vanished or disabled zones are removed. A zone reloaded with
    /// a smaller `max_workers` sheds its newest workers until it fits.
    pub fn prune_stale_zones(&self) -> usize {
        let mut removed = 0;
        for id in self.index.all_ids() {
            let Some(worker) = self.index.get(id) else {
                continue;
            };
            let reason = match self.zones.get(worker.zone_id()) {
                None => RemovalReason::ZoneRemoved,
                Some(zone) if !zone.enabled => RemovalReason::ZoneDisabled,
                Some(_) => continue,
            };
            if self.remove_with_reason(id, reason) {
                removed += 1;
            }
        }

        for zone in self.zones.all() {
            let mut ids = self.index.ids_in_zone(&zone.id);
            if ids.len() <= zone.max_workers {
                continue;
            }
            ids.sort_unstable();
            let excess = ids.split_off(zone.max_workers);
            warn!(
                target: "runtime::scheduler",
                zone = %zone.id,
                max_workers = zone.max_workers,
                excess = excess.len(),
                "Zone over capacity after reload"
            );
            removed += excess
                .into_iter()
                .rev()
                .filter(|id| self.remove_with_reason(*id, RemovalReason::OverCapacity))
                .count();
        }
        removed
    }

    /// Refuses new workers and force-removes every existing one.
    ///
    /// Harvests still in flight may complete afterwards; their results are
    /// discarded. Safe to call more than once.
    pub fn shutdown(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        let removed = self
            .index
            .all_ids()
            .into_iter()
            .filter(|id| self.remove_with_reason(*id, RemovalReason::Shutdown))
            .count();
        info!(target: "runtime::scheduler", removed, "Scheduler drained");
        removed
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Processes every active worker once. Never awaits an external call.
    ///
    /// A host facade panicking for one worker skips that worker for this tick
    /// only; the rest of the tick and later ticks proceed.
    pub fn tick(self: &Arc<Self>) -> TickSummary {
        let now = Instant::now();
        let mut summary = TickSummary::default();

        for worker in self.index.snapshot_active() {
            summary.scanned += 1;
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| self.process_worker(&worker, now)));
            match outcome {
                Ok(TickOutcome::Dispatched) => summary.dispatched += 1,
                Ok(TickOutcome::Removed) => summary.removed += 1,
                Ok(TickOutcome::Skipped) => {}
                Err(_) => {
                    summary.panicked += 1;
                    error!(
                        target: "runtime::scheduler",
                        worker = %worker.id(),
                        player = %worker.owner(),
                        "Worker tick panicked, skipping"
                    );
                }
            }
        }

        summary
    }

    fn process_worker(self: &Arc<Self>, worker: &Arc<Worker>, now: Instant) -> TickOutcome {
        let owner = worker.owner();

        if !self.facades.players.is_connected(owner) {
            return if self.remove_with_reason(worker.id(), RemovalReason::Disconnected) {
                TickOutcome::Removed
            } else {
                TickOutcome::Skipped
            };
        }

        let Some(zone) = self.zones.get(worker.zone_id()) else {
            return if self.remove_with_reason(worker.id(), RemovalReason::ZoneRemoved) {
                TickOutcome::Removed
            } else {
                TickOutcome::Skipped
            };
        };
        if !zone.enabled {
            return TickOutcome::Skipped;
        }

        if worker.harvest_in_flight() || !worker.can_harvest(zone.harvest_interval(), now) {
            return TickOutcome::Skipped;
        }
        let Some(mut slot) = HarvestSlot::claim(worker, now) else {
            return TickOutcome::Skipped;
        };

        let tool = worker
            .cached_tool()
            .or_else(|| self.resolve_tool(owner).map(|tool| worker.cache_tool(tool)));
        let Some(tool) = tool else {
            debug!(
                target: "runtime::scheduler",
                worker = %worker.id(),
                player = %owner,
                "No tool resolved, skipping harvest"
            );
            return TickOutcome::Skipped;
        };

        let position = self
            .facades
            .farming
            .target_position(owner)
            .or_else(|| zone.fallback_target());
        let Some(position) = position else {
            debug!(
                target: "runtime::scheduler",
                worker = %worker.id(),
                zone = %zone.id,
                "Zone has no harvest target, skipping harvest"
            );
            return TickOutcome::Skipped;
        };

        let request = HarvestRequest {
            worker: worker.id(),
            player: owner,
            zone: zone.id.clone(),
            position,
            tool,
            flags: HarvestFlags::for_zone(&zone),
        };

        slot.dispatch(&self.metrics);
        self.events.publish(HarvestEvent::Dispatched {
            worker: worker.id(),
            player: owner,
            zone: zone.id.clone(),
        });

        let scheduler = Arc::clone(self);
        self.runtime.spawn(scheduler.run_harvest(slot, zone, request));

        TickOutcome::Dispatched
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_worker(&self, id: WorkerId) -> Option<Arc<Worker>> {
        self.index.get(id)
    }

    /// Lowest-id worker of `player`, when they have any.
    pub fn get_worker_by_player(&self, player: PlayerId) -> Option<Arc<Worker>> {
        self.index.by_player(player).into_iter().next()
    }

    pub fn get_player_workers(&self, player: PlayerId) -> Vec<Arc<Worker>> {
        self.index.by_player(player)
    }

    pub fn get_player_worker_in_zone(&self, player: PlayerId, zone: &ZoneId) -> Option<Arc<Worker>> {
        self.index.find(player, zone)
    }

    /// Active workers of `zone`.
    pub fn get_zone_workers(&self, zone: &ZoneId) -> Vec<Arc<Worker>> {
        self.index.by_zone(zone)
    }

    /// Every active worker.
    pub fn get_all_workers(&self) -> Vec<Arc<Worker>> {
        let mut workers = self.index.snapshot_active();
        workers.sort_by_key(|worker| worker.id());
        workers
    }

    /// Time left before the worker may harvest again. `None` for unknown
    /// workers or workers whose zone is gone.
    pub fn time_until_next_harvest(&self, id: WorkerId, now: Instant) -> Option<Duration> {
        let worker = self.index.get(id)?;
        let zone = self.zones.get(worker.zone_id())?;
        Some(worker.time_until_next_harvest(zone.harvest_interval(), now))
    }

    /// Active plus pending workers holding a slot in `zone`.
    pub fn occupancy(&self, zone: &ZoneId) -> usize {
        self.index.occupancy(zone)
    }

    pub fn active_count(&self) -> usize {
        self.index.active_len()
    }

    pub fn pending_count(&self) -> usize {
        self.index.pending_len()
    }

    pub fn is_consistent(&self) -> bool {
        self.index.is_consistent()
    }
}
