mod common;

use common::{Harness, outside, settle, zone_definition};
use runtime::{ItemStack, JoinError, JoinGate, PERMISSION_CLICK, PERMISSION_USE, ToggleOutcome};
use zone_core::{BlockPos, Location, PlayerId, ZoneId};

const A: PlayerId = PlayerId(1);
const B: PlayerId = PlayerId(2);

fn anchor() -> BlockPos {
    BlockPos::new("world", 10, 64, 10)
}

fn gate(h: &Harness) -> JoinGate {
    JoinGate::new(h.scheduler.clone())
}

#[tokio::test(start_paused = true)]
async fn command_join_checks_preconditions_in_order() {
    let h = Harness::new(vec![zone_definition("quarry", 1)]);
    let gate = gate(&h);
    let quarry = ZoneId::from("quarry");

    assert_eq!(gate.join_by_command(A, &quarry).unwrap_err(), JoinError::PlayerOffline);

    h.players.connect(A, "alex", outside());
    assert_eq!(
        gate.join_by_command(A, &quarry).unwrap_err(),
        JoinError::MissingPermission { permission: PERMISSION_USE }
    );

    h.players.grant(A, PERMISSION_USE);
    assert_eq!(
        gate.join_by_command(A, &ZoneId::from("nowhere")).unwrap_err(),
        JoinError::ZoneNotFound { zone: ZoneId::from("nowhere") }
    );
    assert_eq!(
        gate.join_by_command(A, &quarry).unwrap_err(),
        JoinError::NotInsideGeofence { zone: quarry.clone() }
    );

    // Command joins do not need a tool in hand.
    h.players.move_to(A, Location::new("world", 3.0, 65.0, 3.0));
    let worker = gate.join_by_command(A, &quarry).expect("join should succeed");
    assert_eq!(worker.zone_id(), &quarry);

    h.connect_inside(B, "quarry");
    assert_eq!(
        gate.join_by_command(B, &quarry).unwrap_err(),
        JoinError::ZoneFull { zone: quarry }
    );
}

#[tokio::test(start_paused = true)]
async fn command_join_rejects_disabled_and_unbounded_zones() {
    let mut open = zone_definition("open", 5);
    open.max_corner = None;
    let h = Harness::new(vec![zone_definition("quarry", 5), open]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");

    assert_eq!(
        gate.join_by_command(A, &ZoneId::from("open")).unwrap_err(),
        JoinError::InvalidGeofence { zone: ZoneId::from("open") }
    );

    h.zones.set_enabled(&ZoneId::from("quarry"), false);
    assert_eq!(
        gate.join_by_command(A, &ZoneId::from("quarry")).unwrap_err(),
        JoinError::ZoneNotFound { zone: ZoneId::from("quarry") }
    );
}

#[tokio::test(start_paused = true)]
async fn anchor_click_toggles_the_worker() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");

    let worker = match gate.toggle_at_anchor(A, &anchor()).unwrap() {
        ToggleOutcome::Activated(worker) => worker,
        other => panic!("expected activation, got {other:?}"),
    };
    settle().await;

    match gate.toggle_at_anchor(A, &anchor()).unwrap() {
        ToggleOutcome::Deactivated(id) => assert_eq!(id, worker.id()),
        other => panic!("expected deactivation, got {other:?}"),
    }
    assert!(worker.is_removed());
    assert!(h.scheduler.get_player_workers(A).is_empty());
}

#[tokio::test(start_paused = true)]
async fn anchor_click_elsewhere_is_ignored() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");

    assert!(matches!(
        gate.toggle_at_anchor(A, &BlockPos::new("world", 11, 64, 10)).unwrap(),
        ToggleOutcome::Ignored
    ));

    h.zones.set_enabled(&ZoneId::from("quarry"), false);
    assert!(matches!(
        gate.toggle_at_anchor(A, &anchor()).unwrap(),
        ToggleOutcome::Ignored
    ));
}

#[tokio::test(start_paused = true)]
async fn anchor_click_requires_permission_and_allowed_tool() {
    let mut definition = zone_definition("quarry", 5);
    definition.allowed_tools = vec!["pickaxe".to_owned()];
    let h = Harness::new(vec![definition]);
    let gate = gate(&h);

    h.players.connect(A, "alex", Location::new("world", 10.0, 65.0, 10.0));
    assert_eq!(
        gate.toggle_at_anchor(A, &anchor()).unwrap_err(),
        JoinError::MissingPermission { permission: PERMISSION_CLICK }
    );

    h.players.grant(A, PERMISSION_CLICK);
    assert_eq!(
        gate.toggle_at_anchor(A, &anchor()).unwrap_err(),
        JoinError::ToolNotAllowed { zone: ZoneId::from("quarry") }
    );

    h.players.hold(A, Some(ItemStack::tool("GOLDEN_HOE", "hoe")));
    assert_eq!(
        gate.toggle_at_anchor(A, &anchor()).unwrap_err(),
        JoinError::ToolNotAllowed { zone: ZoneId::from("quarry") }
    );

    h.players.hold(A, Some(ItemStack::tool("IRON_PICKAXE", "pickaxe")));
    assert!(matches!(
        gate.toggle_at_anchor(A, &anchor()).unwrap(),
        ToggleOutcome::Activated(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn anchor_click_from_outside_the_geofence_is_refused() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");
    h.players.move_to(A, outside());

    assert_eq!(
        gate.toggle_at_anchor(A, &anchor()).unwrap_err(),
        JoinError::NotInsideGeofence { zone: ZoneId::from("quarry") }
    );
}

#[tokio::test(start_paused = true)]
async fn leaving_the_geofence_removes_the_worker() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");
    let worker = gate.join_by_command(A, &ZoneId::from("quarry")).unwrap();
    settle().await;

    let here = Location::new("world", 10.2, 70.0, 10.2);
    let same_block = Location::new("world", 10.8, 70.5, 10.9);
    assert_eq!(gate.handle_move(A, &here, &same_block), 0);

    let still_inside = Location::new("world", 19.0, 70.0, 19.0);
    assert_eq!(gate.handle_move(A, &here, &still_inside), 0);
    assert!(worker.is_active());

    assert_eq!(gate.handle_move(A, &still_inside, &outside()), 1);
    assert!(worker.is_removed());
    assert_eq!(gate.handle_move(A, &still_inside, &outside()), 0);
}

#[tokio::test(start_paused = true)]
async fn leave_and_disconnect_remove_all_player_workers() {
    let h = Harness::new(vec![zone_definition("quarry", 5), zone_definition("farm", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");
    gate.join_by_command(A, &ZoneId::from("quarry")).unwrap();
    gate.join_by_command(A, &ZoneId::from("farm")).unwrap();
    settle().await;

    assert_eq!(gate.leave(A), 2);
    assert!(h.farming.session(A).is_some(), "session survives leaving");

    gate.join_by_command(A, &ZoneId::from("quarry")).unwrap();
    settle().await;
    assert_eq!(gate.handle_disconnect(A), 1);
    assert_eq!(gate.handle_disconnect(A), 0);
}

#[tokio::test(start_paused = true)]
async fn anchor_is_protected_unless_working_there() {
    let h = Harness::new(vec![zone_definition("quarry", 5)]);
    let gate = gate(&h);
    h.connect_inside(A, "quarry");
    h.connect_inside(B, "quarry");
    gate.join_by_command(A, &ZoneId::from("quarry")).unwrap();

    assert!(gate.can_break_anchor(A, &anchor()));
    assert!(!gate.can_break_anchor(B, &anchor()));
    assert!(gate.can_break_anchor(B, &BlockPos::new("world", 1, 61, 1)));

    h.zones.set_enabled(&ZoneId::from("quarry"), false);
    assert!(gate.can_break_anchor(B, &anchor()));
}
