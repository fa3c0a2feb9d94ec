//! Event types for different topics.

use serde::{Deserialize, Serialize};
use zone_core::{PlayerId, WorkerId, ZoneId};

/// Why a worker left the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Explicit leave or toggle.
    Requested,
    /// The owner walked out of the geofence.
    LeftZone,
    /// The owner is no longer connected.
    Disconnected,
    ZoneDisabled,
    /// The zone vanished on reload.
    ZoneRemoved,
    /// The zone was reloaded with fewer slots than it had workers.
    OverCapacity,
    Shutdown,
}

/// Worker lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerEvent {
    /// Slot reserved; the presentation entity has been requested.
    Created {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
    },

    /// The entity attached and the worker is now scheduled.
    Activated {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
    },

    Removed {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
        reason: RemovalReason,
    },
}

/// Harvest dispatch and completion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HarvestEvent {
    Dispatched {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
    },

    /// A harvest succeeded and was recorded on the worker.
    Completed {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
        harvest_count: u64,
        resource: String,
        currency: String,
        /// Currency reward, when currency rewards are enabled.
        reward: Option<f64>,
        /// Experience granted, zero when leveling is off for this zone.
        experience: f64,
        sold: Option<String>,
    },

    Failed {
        worker: WorkerId,
        player: PlayerId,
        zone: ZoneId,
        error: String,
    },
}
