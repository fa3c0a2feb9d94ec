//! Worker indices: the primary map and the per-zone secondary index.
//!
//! Both indices live behind one lock so every insert and removal touches them
//! together. Critical sections are short map operations only; no external
//! call or await ever happens while the lock is held.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zone_core::{PlayerId, WorkerId, ZoneId};

use super::worker::{Worker, WorkerPhase};
use crate::api::ResourceHandle;

#[derive(Debug, Default)]
struct Indices {
    /// Active workers.
    workers: HashMap<WorkerId, Arc<Worker>>,
    /// Active worker ids per zone.
    by_zone: HashMap<ZoneId, HashSet<WorkerId>>,
    /// Workers waiting for their presentation entity. Counted against capacity.
    pending: HashMap<WorkerId, Arc<Worker>>,
}

impl Indices {
    fn occupancy(&self, zone: &ZoneId) -> usize {
        let active = self.by_zone.get(zone).map_or(0, HashSet::len);
        let pending = self
            .pending
            .values()
            .filter(|worker| worker.zone_id() == zone)
            .count();
        active + pending
    }

    fn find(&self, player: PlayerId, zone: &ZoneId) -> Option<&Arc<Worker>> {
        self.workers
            .values()
            .chain(self.pending.values())
            .find(|worker| worker.owner() == player && worker.zone_id() == zone)
    }
}

/// Result of [`WorkerIndex::reserve`].
#[derive(Debug)]
pub enum Reservation {
    /// The player already has a worker in this zone.
    Existing(Arc<Worker>),
    /// The zone is at capacity.
    Full,
    /// A new pending worker holds a slot.
    Reserved(Arc<Worker>),
}

#[derive(Debug, Default)]
pub struct WorkerIndex {
    inner: RwLock<Indices>,
}

impl WorkerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Indices> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indices> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks idempotence and capacity, then reserves a pending slot, all under
    /// one write lock so two concurrent joins cannot both take the last slot.
    pub fn reserve(
        &self,
        player: PlayerId,
        zone: &ZoneId,
        max_workers: usize,
        make: impl FnOnce() -> Worker,
    ) -> Reservation {
        let mut indices = self.write();

        if let Some(existing) = indices.find(player, zone) {
            return Reservation::Existing(Arc::clone(existing));
        }
        if indices.occupancy(zone) >= max_workers {
            return Reservation::Full;
        }

        let worker = Arc::new(make());
        indices.pending.insert(worker.id(), Arc::clone(&worker));
        Reservation::Reserved(worker)
    }

    /// Moves a pending worker into both active indices with its handle attached.
    ///
    /// When the worker was removed in the meantime the handle is handed back
    /// so the caller can release it.
    pub fn activate(&self, id: WorkerId, handle: ResourceHandle) -> Result<Arc<Worker>, ResourceHandle> {
        let mut indices = self.write();

        let Some(worker) = indices.pending.remove(&id) else {
            return Err(handle);
        };
        worker.attach(handle)?;

        indices
            .by_zone
            .entry(worker.zone_id().clone())
            .or_default()
            .insert(id);
        indices.workers.insert(id, Arc::clone(&worker));
        Ok(worker)
    }

    /// Removes a worker from every index and marks it removed.
    ///
    /// Returns the worker and its resource handle (if it ever attached) the
    /// first time only; later calls and unknown ids yield `None`.
    pub fn remove(&self, id: WorkerId) -> Option<(Arc<Worker>, Option<ResourceHandle>)> {
        let mut indices = self.write();

        let worker = match indices.workers.remove(&id) {
            Some(worker) => {
                if let Some(ids) = indices.by_zone.get_mut(worker.zone_id()) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        indices.by_zone.remove(worker.zone_id());
                    }
                }
                worker
            }
            None => indices.pending.remove(&id)?,
        };

        let handle = worker.mark_removed()?;
        Some((worker, handle))
    }

    pub fn get(&self, id: WorkerId) -> Option<Arc<Worker>> {
        let indices = self.read();
        indices
            .workers
            .get(&id)
            .or_else(|| indices.pending.get(&id))
            .cloned()
    }

    /// Active and pending worker of `player` in `zone`.
    pub fn find(&self, player: PlayerId, zone: &ZoneId) -> Option<Arc<Worker>> {
        self.read().find(player, zone).cloned()
    }

    /// Every worker (active or pending) owned by `player`.
    pub fn by_player(&self, player: PlayerId) -> Vec<Arc<Worker>> {
        let indices = self.read();
        let mut workers: Vec<_> = indices
            .workers
            .values()
            .chain(indices.pending.values())
            .filter(|worker| worker.owner() == player)
            .cloned()
            .collect();
        workers.sort_by_key(|worker| worker.id());
        workers
    }

    /// Active workers of `zone`, resolved through the secondary index.
    pub fn by_zone(&self, zone: &ZoneId) -> Vec<Arc<Worker>> {
        let indices = self.read();
        let Some(ids) = indices.by_zone.get(zone) else {
            return Vec::new();
        };
        let mut workers: Vec<_> = ids
            .iter()
            .filter_map(|id| indices.workers.get(id))
            .cloned()
            .collect();
        workers.sort_by_key(|worker| worker.id());
        workers
    }

    /// Ids of every worker bound to `zone`, pending ones included.
    pub fn ids_in_zone(&self, zone: &ZoneId) -> Vec<WorkerId> {
        let indices = self.read();
        indices
            .workers
            .values()
            .chain(indices.pending.values())
            .filter(|worker| worker.zone_id() == zone)
            .map(|worker| worker.id())
            .collect()
    }

    /// Point-in-time copy of the active workers. Safe to iterate while others
    /// insert or remove.
    pub fn snapshot_active(&self) -> Vec<Arc<Worker>> {
        self.read().workers.values().cloned().collect()
    }

    /// Ids of every worker, pending ones included.
    pub fn all_ids(&self) -> Vec<WorkerId> {
        let indices = self.read();
        indices
            .workers
            .keys()
            .chain(indices.pending.keys())
            .copied()
            .collect()
    }

    /// Active plus pending workers bound to `zone`.
    pub fn occupancy(&self, zone: &ZoneId) -> usize {
        self.read().occupancy(zone)
    }

    pub fn active_len(&self) -> usize {
        self.read().workers.len()
    }

    pub fn pending_len(&self) -> usize {
        self.read().pending.len()
    }

    /// Verifies the two indices agree:
    /// - every id in a zone entry maps to an active worker of that zone
    /// - every active worker appears in its zone's entry
    /// - no worker sits in both the active and pending maps
    pub fn is_consistent(&self) -> bool {
        let indices = self.read();

        let zone_entries_valid = indices.by_zone.iter().all(|(zone, ids)| {
            ids.iter().all(|id| {
                indices
                    .workers
                    .get(id)
                    .is_some_and(|worker| worker.zone_id() == zone)
            })
        });

        let workers_indexed = indices.workers.iter().all(|(id, worker)| {
            worker.phase() == WorkerPhase::Active
                && indices
                    .by_zone
                    .get(worker.zone_id())
                    .is_some_and(|ids| ids.contains(id))
        });

        let disjoint = indices
            .pending
            .keys()
            .all(|id| !indices.workers.contains_key(id));

        zone_entries_valid && workers_indexed && disjoint
    }
}
