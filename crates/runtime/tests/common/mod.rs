//! Shared fixtures: sim facades wired into a scheduler driven by hand.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use runtime::sim::{SimFarming, SimPlayers, SimPresentation};
use runtime::{EventBus, Facades, HarvestMetrics, ItemStack, WorkerScheduler, ZoneRegistry};
use zone_core::{Location, PlayerId, RewardSettings, Zone, ZoneDefinition, ZoneId};

pub const INTERVAL: Duration = Duration::from_millis(5000);

pub struct Harness {
    pub players: Arc<SimPlayers>,
    pub farming: Arc<SimFarming>,
    pub presentation: Arc<SimPresentation>,
    pub zones: Arc<ZoneRegistry>,
    pub events: EventBus,
    pub metrics: Arc<HarvestMetrics>,
    pub scheduler: Arc<WorkerScheduler>,
}

impl Harness {
    /// Must be called from within a Tokio runtime.
    pub fn new(definitions: Vec<ZoneDefinition>) -> Self {
        Self::with_rewards(definitions, RewardSettings::default())
    }

    pub fn with_rewards(definitions: Vec<ZoneDefinition>, rewards: RewardSettings) -> Self {
        let players = Arc::new(SimPlayers::new());
        let farming = Arc::new(SimFarming::new(Arc::clone(&players)));
        let presentation = Arc::new(SimPresentation::new());
        let zones = Arc::new(ZoneRegistry::new());
        zones.load(definitions);
        let events = EventBus::with_capacity(64);
        let metrics = Arc::new(HarvestMetrics::new());

        let scheduler = WorkerScheduler::new(
            Arc::clone(&zones),
            Facades {
                farming: farming.clone(),
                presentation: presentation.clone(),
                players: players.clone(),
            },
            events.clone(),
            Arc::clone(&metrics),
            rewards,
            tokio::runtime::Handle::current(),
        );

        Self {
            players,
            farming,
            presentation,
            zones,
            events,
            metrics,
            scheduler,
        }
    }

    pub fn zone(&self, id: &str) -> Arc<Zone> {
        self.zones.get(&ZoneId::from(id)).expect("zone should be loaded")
    }

    /// Connects a player inside `zone`'s geofence, holding a pickaxe, with both
    /// join permissions.
    pub fn connect_inside(&self, player: PlayerId, zone: &str) {
        let center = self
            .zone(zone)
            .geofence
            .as_ref()
            .expect("zone should have a geofence")
            .center();
        self.players.connect(player, format!("p{}", player.0), center);
        self.players
            .hold(player, Some(ItemStack::tool("DIAMOND_PICKAXE", "pickaxe")));
        self.players.grant(player, runtime::PERMISSION_USE);
        self.players.grant(player, runtime::PERMISSION_CLICK);
    }
}

/// Catalog entry for a 21x21x21 box centered on (10, 70, 10) in `world`.
pub fn zone_definition(id: &str, max_workers: usize) -> ZoneDefinition {
    ZoneDefinition {
        id: id.to_owned(),
        kind: "MINING".to_owned(),
        min_corner: Some("world:0:60:0".to_owned()),
        max_corner: Some("world:20:80:20".to_owned()),
        center_location: Some("world:10:64:10".to_owned()),
        harvest_interval: INTERVAL.as_millis() as u64,
        max_workers,
        ..ZoneDefinition::default()
    }
}

pub fn outside() -> Location {
    Location::new("world", 100.0, 64.0, 100.0)
}

/// Lets spawned tasks run without moving the paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
