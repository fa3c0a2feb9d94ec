//! Per-(player, zone) worker record.
//!
//! A worker holds ids, never references: the zone is resolved through the
//! registry on every tick and the owner through the player directory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use zone_core::{PlayerId, ToolId, WorkerId, ZoneId};

use crate::api::ResourceHandle;

/// Lifecycle of a worker. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Slot reserved, presentation entity requested, not scheduled.
    Pending,
    /// Scheduled by the tick driver.
    Active,
    /// Terminal. The resource handle has been released.
    Removed,
}

#[derive(Debug)]
struct WorkerState {
    phase: WorkerPhase,
    last_harvest: Instant,
    /// Last dispatch, successful or not. Gates retries after a failure.
    last_attempt: Instant,
    harvest_count: u64,
    cached_tool: Option<ToolId>,
}

impl WorkerState {
    fn harvest_clock(&self) -> Instant {
        self.last_harvest.max(self.last_attempt)
    }
}

#[derive(Debug)]
pub struct Worker {
    id: WorkerId,
    owner: PlayerId,
    zone: ZoneId,
    created_at: Instant,
    state: Mutex<WorkerState>,
    resource: Mutex<Option<ResourceHandle>>,
    in_flight: AtomicBool,
}

/// Read-only copy of a worker's mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub owner: PlayerId,
    pub zone: ZoneId,
    pub phase: WorkerPhase,
    pub harvest_count: u64,
    pub last_harvest: Instant,
    pub last_attempt: Instant,
    pub cached_tool: Option<ToolId>,
    pub harvest_in_flight: bool,
}

impl Worker {
    /// New pending worker. The harvest clock starts at creation, so the first
    /// harvest fires one full interval after joining.
    pub fn new(id: WorkerId, owner: PlayerId, zone: ZoneId, now: Instant) -> Self {
        Self {
            id,
            owner,
            zone,
            created_at: now,
            state: Mutex::new(WorkerState {
                phase: WorkerPhase::Pending,
                last_harvest: now,
                last_attempt: now,
                harvest_count: 0,
                cached_tool: None,
            }),
            resource: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn zone_id(&self) -> &ZoneId {
        &self.zone
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn phase(&self) -> WorkerPhase {
        self.state().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase() == WorkerPhase::Active
    }

    pub fn is_removed(&self) -> bool {
        self.phase() == WorkerPhase::Removed
    }

    pub fn harvest_count(&self) -> u64 {
        self.state().harvest_count
    }

    pub fn last_harvest(&self) -> Instant {
        self.state().last_harvest
    }

    pub fn cached_tool(&self) -> Option<ToolId> {
        self.state().cached_tool.clone()
    }

    /// Caches the tool unless one is already cached. Returns the cached tool.
    pub fn cache_tool(&self, tool: ToolId) -> ToolId {
        self.state().cached_tool.get_or_insert(tool).clone()
    }

    pub fn last_attempt(&self) -> Instant {
        self.state().last_attempt
    }

    /// Pure eligibility check: a full interval has passed since the last
    /// harvest and since the last attempt.
    pub fn can_harvest(&self, interval: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.state().harvest_clock()) >= interval
    }

    pub fn time_until_next_harvest(&self, interval: Duration, now: Instant) -> Duration {
        interval.saturating_sub(now.saturating_duration_since(self.state().harvest_clock()))
    }

    /// Records a completed harvest.
    ///
    /// Returns the new harvest count, or `None` when the worker was removed
    /// while the harvest was in flight; the completion is then discarded.
    pub fn record_harvest(&self, completed_at: Instant) -> Option<u64> {
        let mut state = self.state();
        if state.phase == WorkerPhase::Removed {
            return None;
        }
        state.harvest_count += 1;
        state.last_harvest = completed_at;
        Some(state.harvest_count)
    }

    /// Claims the single in-flight slot and stamps the attempt time. False
    /// when a harvest is already running.
    pub fn try_begin_harvest(&self, at: Instant) -> bool {
        let claimed = self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if claimed {
            self.state().last_attempt = at;
        }
        claimed
    }

    pub fn finish_harvest(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn harvest_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Pending -> Active with the attached handle. Called by the index under its lock.
    pub(crate) fn attach(&self, handle: ResourceHandle) -> Result<(), ResourceHandle> {
        let mut state = self.state();
        if state.phase != WorkerPhase::Pending {
            return Err(handle);
        }
        *self.resource.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        state.phase = WorkerPhase::Active;
        Ok(())
    }

    /// Marks the worker removed and hands back its resource, at most once.
    pub(crate) fn mark_removed(&self) -> Option<Option<ResourceHandle>> {
        let mut state = self.state();
        if state.phase == WorkerPhase::Removed {
            return None;
        }
        state.phase = WorkerPhase::Removed;
        Some(self.resource.lock().unwrap_or_else(PoisonError::into_inner).take())
    }

    pub fn snapshot(&self) -> WorkerSnapshot {
        let state = self.state();
        WorkerSnapshot {
            id: self.id,
            owner: self.owner,
            zone: self.zone.clone(),
            phase: state.phase,
            harvest_count: state.harvest_count,
            last_harvest: state.last_harvest,
            last_attempt: state.last_attempt,
            cached_tool: state.cached_tool.clone(),
            harvest_in_flight: self.harvest_in_flight(),
        }
    }
}
