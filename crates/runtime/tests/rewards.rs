mod common;

use common::{Harness, INTERVAL, settle, zone_definition};
use runtime::{Event, HarvestEvent, Topic};
use tokio::time::advance;
use zone_core::{PlayerId, RewardSettings, ZoneDefinition};

const A: PlayerId = PlayerId(1);

async fn harvest_once(h: &Harness) -> HarvestEvent {
    let mut harvests = h.events.subscribe(Topic::Harvest);
    h.scheduler
        .create_worker(A, &h.zone("quarry"))
        .expect("worker should be created");
    settle().await;
    advance(INTERVAL).await;
    h.scheduler.tick();
    settle().await;

    loop {
        match harvests.recv().await.expect("harvest event") {
            Event::Harvest(event @ HarvestEvent::Completed { .. }) => return event,
            Event::Harvest(HarvestEvent::Dispatched { .. }) => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }
}

fn rewards_of(event: &HarvestEvent) -> (Option<f64>, f64) {
    match event {
        HarvestEvent::Completed {
            reward, experience, ..
        } => (*reward, *experience),
        _ => unreachable!(),
    }
}

fn farming_zone() -> ZoneDefinition {
    ZoneDefinition {
        kind: "FARMING".to_owned(),
        base_reward: 50.0,
        ..zone_definition("quarry", 5)
    }
}

#[tokio::test(start_paused = true)]
async fn booster_scales_currency_reward() {
    let h = Harness::new(vec![farming_zone()]);
    h.connect_inside(A, "quarry");
    h.farming.set_booster(2.5);

    let (reward, experience) = rewards_of(&harvest_once(&h).await);

    assert_eq!(reward, Some(125.0));
    assert!((experience - 5.0).abs() < 1e-9);
    assert_eq!(
        h.farming.experience_grants(),
        vec![(A, "farming-level".to_owned(), experience)]
    );
}

#[tokio::test(start_paused = true)]
async fn zone_without_boosters_ignores_the_multiplier() {
    let mut definition = farming_zone();
    definition.integration.apply_boosters = false;
    let h = Harness::new(vec![definition]);
    h.connect_inside(A, "quarry");
    h.farming.set_booster(3.0);

    let (reward, _) = rewards_of(&harvest_once(&h).await);
    assert_eq!(reward, Some(50.0));
}

#[tokio::test(start_paused = true)]
async fn global_switches_disable_rewards_and_leveling() {
    let rewards = RewardSettings {
        currency_rewards: false,
        booster_effects: true,
        leveling: false,
    };
    let h = Harness::with_rewards(vec![farming_zone()], rewards);
    h.connect_inside(A, "quarry");

    let (reward, experience) = rewards_of(&harvest_once(&h).await);

    assert_eq!(reward, None);
    assert_eq!(experience, 0.0);
    assert!(h.farming.experience_grants().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zone_without_experience_grants_none() {
    let mut definition = zone_definition("quarry", 5);
    definition.integration.grant_experience = false;
    let h = Harness::new(vec![definition]);
    h.connect_inside(A, "quarry");

    let (_, experience) = rewards_of(&harvest_once(&h).await);

    assert_eq!(experience, 0.0);
    assert!(h.farming.experience_grants().is_empty());
}

#[tokio::test(start_paused = true)]
async fn mining_experience_goes_to_the_mining_track() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    h.connect_inside(A, "quarry");

    harvest_once(&h).await;

    let grants = h.farming.experience_grants();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].1, "mining-level");
    assert!((grants[0].2 - 12.0).abs() < 1e-9);
}
