//! Demo wiring: simulated players and an event log sink.
use std::sync::Arc;

use runtime::sim::SimPlayers;
use runtime::{Event, ItemStack, PERMISSION_CLICK, PERMISSION_USE, RuntimeHandle, Topic};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use zone_core::PlayerId;

/// Connects `count` simulated players at the center of the first bounded zone
/// and joins each of them through the gate.
pub fn join_demo_players(handle: &RuntimeHandle, players: &Arc<SimPlayers>, count: u64) -> usize {
    let mut zones = handle.zones().all();
    zones.sort_by(|a, b| a.id.cmp(&b.id));
    let Some(zone) = zones
        .into_iter()
        .find(|zone| zone.enabled && zone.geofence.is_some())
    else {
        tracing::warn!("No enabled zone with a geofence, skipping demo players");
        return 0;
    };
    let Some(center) = zone.geofence.as_ref().map(|fence| fence.center()) else {
        return 0;
    };

    let gate = handle.gate();
    let mut joined = 0;
    for n in 1..=count {
        let player = PlayerId(n);
        players.connect(player, format!("demo-{}", n), center.clone());
        players.grant(player, PERMISSION_USE);
        players.grant(player, PERMISSION_CLICK);
        players.hold(player, Some(ItemStack::tool("DIAMOND_PICKAXE", "demo-pickaxe")));

        match gate.join_by_command(player, &zone.id) {
            Ok(worker) => {
                tracing::info!(player = %player, worker = %worker.id(), zone = %zone.id, "Demo player joined");
                joined += 1;
            }
            Err(e) => tracing::warn!(player = %player, zone = %zone.id, "Demo player refused: {}", e),
        }
    }
    joined
}

/// Writes every runtime event to the log as one JSON line.
pub fn spawn_event_logger(handle: &RuntimeHandle) -> JoinHandle<()> {
    let mut workers = handle.subscribe(Topic::Worker);
    let mut harvests = handle.subscribe(Topic::Harvest);

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                event = workers.recv() => event,
                event = harvests.recv() => event,
            };
            match received {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "afkzoned::events", skipped, "Event logger lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(target: "afkzoned::events", "{}", json),
        Err(e) => tracing::warn!(target: "afkzoned::events", "Failed to encode event: {}", e),
    }
}

