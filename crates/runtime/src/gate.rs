//! Caller-side join preconditions.
//!
//! The scheduler itself only enforces idempotence and capacity. Everything a
//! player can be told "no" about (permissions, geofence, tool) is checked
//! here, synchronously, before a worker is created.

use std::sync::Arc;

use tracing::debug;
use zone_core::{BlockPos, Location, PlayerId, WorkerId, Zone, ZoneId};

use crate::api::JoinError;
use crate::events::RemovalReason;
use crate::scheduler::{Worker, WorkerScheduler};

/// Permission required to join via command.
pub const PERMISSION_USE: &str = "afkzone.use";
/// Permission required to toggle a worker by clicking a zone anchor.
pub const PERMISSION_CLICK: &str = "afkzone.click";

/// Result of clicking a zone anchor.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// The block is not the anchor of an enabled zone.
    Ignored,
    Activated(Arc<Worker>),
    Deactivated(WorkerId),
}

#[derive(Clone)]
pub struct JoinGate {
    scheduler: Arc<WorkerScheduler>,
}

impl JoinGate {
    pub fn new(scheduler: Arc<WorkerScheduler>) -> Self {
        Self { scheduler }
    }

    /// Command-triggered join. Does not require holding a tool.
    pub fn join_by_command(&self, player: PlayerId, zone: &ZoneId) -> Result<Arc<Worker>, JoinError> {
        let players = &self.scheduler.facades().players;
        if !players.is_connected(player) {
            return Err(JoinError::PlayerOffline);
        }
        if !players.has_permission(player, PERMISSION_USE) {
            return Err(JoinError::MissingPermission {
                permission: PERMISSION_USE,
            });
        }

        let zone = self
            .scheduler
            .zones()
            .get(zone)
            .filter(|zone| zone.enabled)
            .ok_or_else(|| JoinError::ZoneNotFound { zone: zone.clone() })?;

        self.check_inside(player, &zone)?;
        self.create(player, &zone)
    }

    /// Anchor click: deactivates the player's worker in that zone if there is
    /// one, otherwise joins.
    pub fn toggle_at_anchor(&self, player: PlayerId, clicked: &BlockPos) -> Result<ToggleOutcome, JoinError> {
        let Some(zone) = self
            .scheduler
            .zones()
            .find_by_anchor(clicked)
            .filter(|zone| zone.enabled)
        else {
            return Ok(ToggleOutcome::Ignored);
        };

        let facades = self.scheduler.facades();
        if !facades.players.is_connected(player) {
            return Err(JoinError::PlayerOffline);
        }
        if !facades.players.has_permission(player, PERMISSION_CLICK) {
            return Err(JoinError::MissingPermission {
                permission: PERMISSION_CLICK,
            });
        }

        let held = facades.farming.resolve_tool_id(player);
        if !zone.is_tool_allowed(held.as_ref()) {
            return Err(JoinError::ToolNotAllowed {
                zone: zone.id.clone(),
            });
        }

        if let Some(existing) = self.scheduler.get_player_worker_in_zone(player, &zone.id) {
            self.scheduler
                .remove_with_reason(existing.id(), RemovalReason::Requested);
            return Ok(ToggleOutcome::Deactivated(existing.id()));
        }

        self.check_inside(player, &zone)?;
        self.create(player, &zone).map(ToggleOutcome::Activated)
    }

    /// Removes the player's workers whose zone no longer contains `to`.
    /// Movement within the same block is ignored.
    pub fn handle_move(&self, player: PlayerId, from: &Location, to: &Location) -> usize {
        if from.block() == to.block() {
            return 0;
        }

        let zones = self.scheduler.zones();
        let mut removed = 0;
        for worker in self.scheduler.get_player_workers(player) {
            let inside = zones.contains_location(worker.zone_id(), to);
            if !inside
                && self
                    .scheduler
                    .remove_with_reason(worker.id(), RemovalReason::LeftZone)
            {
                debug!(
                    target: "runtime::gate",
                    player = %player,
                    zone = %worker.zone_id(),
                    "Player left zone"
                );
                removed += 1;
            }
        }
        removed
    }

    /// Explicit leave. The farming session is kept.
    pub fn leave(&self, player: PlayerId) -> usize {
        self.scheduler
            .remove_player_workers(player, RemovalReason::Requested)
    }

    pub fn handle_disconnect(&self, player: PlayerId) -> usize {
        self.scheduler
            .remove_player_workers(player, RemovalReason::Disconnected)
    }

    /// Anchors of enabled zones can only be broken by players working there.
    pub fn can_break_anchor(&self, player: PlayerId, block: &BlockPos) -> bool {
        match self.scheduler.zones().find_by_anchor(block) {
            Some(zone) if zone.enabled => self
                .scheduler
                .get_player_worker_in_zone(player, &zone.id)
                .is_some(),
            _ => true,
        }
    }

    fn check_inside(&self, player: PlayerId, zone: &Zone) -> Result<(), JoinError> {
        if zone.geofence.is_none() {
            return Err(JoinError::InvalidGeofence {
                zone: zone.id.clone(),
            });
        }

        let location = self
            .scheduler
            .facades()
            .players
            .location(player)
            .ok_or(JoinError::PlayerOffline)?;
        if !zone.contains_location(&location) {
            return Err(JoinError::NotInsideGeofence {
                zone: zone.id.clone(),
            });
        }
        Ok(())
    }

    fn create(&self, player: PlayerId, zone: &Zone) -> Result<Arc<Worker>, JoinError> {
        self.scheduler
            .create_worker(player, zone)
            .ok_or_else(|| JoinError::ZoneFull {
                zone: zone.id.clone(),
            })
    }
}
