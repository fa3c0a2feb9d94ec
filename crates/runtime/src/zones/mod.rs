//! Zone registry: the loaded zone set and its spatial lookups.
//!
//! The zone map is copy-on-write. Readers clone the current `Arc` and work on
//! an immutable snapshot, so a reload or an enable toggle never exposes a
//! half-updated set.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use zone_core::{BlockPos, Location, Zone, ZoneDefinition, ZoneId};

type ZoneMap = HashMap<ZoneId, Arc<Zone>>;

/// Outcome of [`ZoneRegistry::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Entries that failed validation, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: RwLock<Arc<ZoneMap>>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with already validated zones.
    pub fn with_zones(zones: impl IntoIterator<Item = Zone>) -> Self {
        let map = zones
            .into_iter()
            .map(|zone| (zone.id.clone(), Arc::new(zone)))
            .collect();
        Self {
            zones: RwLock::new(Arc::new(map)),
        }
    }

    /// Replaces the full zone set.
    ///
    /// Invalid entries are skipped and logged; the valid ones become visible
    /// together in a single swap.
    pub fn load(&self, definitions: impl IntoIterator<Item = ZoneDefinition>) -> LoadReport {
        let mut report = LoadReport::default();
        let mut next = ZoneMap::new();

        for definition in definitions {
            let id = definition.id.clone();
            match Zone::from_definition(definition) {
                Ok(zone) => {
                    if next.insert(zone.id.clone(), Arc::new(zone)).is_some() {
                        tracing::warn!(
                            target: "runtime::zones",
                            zone = %id,
                            "Duplicate zone id, keeping the later entry"
                        );
                    }
                }
                Err(error) => {
                    tracing::error!(
                        target: "runtime::zones",
                        zone = %id,
                        error = %error,
                        "Skipping invalid zone"
                    );
                    report.skipped.push((id, error.to_string()));
                }
            }
        }

        report.loaded = next.len();
        *self.zones.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);

        tracing::info!(
            target: "runtime::zones",
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Zones loaded"
        );
        report
    }

    fn snapshot(&self) -> Arc<ZoneMap> {
        Arc::clone(&self.zones.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, id: &ZoneId) -> Option<Arc<Zone>> {
        self.snapshot().get(id).cloned()
    }

    /// First zone whose geofence contains `point`. Ordering across zones is unspecified.
    pub fn find_containing(&self, point: &Location) -> Option<Arc<Zone>> {
        self.snapshot()
            .values()
            .find(|zone| zone.contains_location(point))
            .cloned()
    }

    /// Zone whose interaction anchor sits on `block`.
    pub fn find_by_anchor(&self, block: &BlockPos) -> Option<Arc<Zone>> {
        self.snapshot()
            .values()
            .find(|zone| zone.is_anchor(block))
            .cloned()
    }

    /// False for unknown zones as well as for points outside the geofence.
    pub fn contains_location(&self, zone: &ZoneId, point: &Location) -> bool {
        self.get(zone)
            .is_some_and(|zone| zone.contains_location(point))
    }

    /// Flips a zone's `enabled` flag. Returns false when the zone is unknown.
    pub fn set_enabled(&self, id: &ZoneId, enabled: bool) -> bool {
        let mut guard = self.zones.write().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = guard.get(id) else {
            return false;
        };
        if current.enabled == enabled {
            return true;
        }

        let mut updated = Zone::clone(current);
        updated.enabled = enabled;
        let mut next = ZoneMap::clone(&guard);
        next.insert(id.clone(), Arc::new(updated));
        *guard = Arc::new(next);
        true
    }

    pub fn all(&self) -> Vec<Arc<Zone>> {
        self.snapshot().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
