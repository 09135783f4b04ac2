//! Pose transitions, retract interlock and game-piece handling.

use sst_common::robot::pose::{ExtensionState, GamePiece, Pose};
use sst_control::sim::charge_station::Approach;
use sst_control::superstructure;

use super::{SimHarness, rad};

/// Harness parked at the extended floor pickup pose.
fn at_floor_pickup() -> SimHarness {
    let mut h = SimHarness::new(Approach::FromNear);
    h.schedule(superstructure::floor_pickup());
    h.run_until_idle(300).unwrap();
    assert_eq!(h.core.robot().extension.state(), ExtensionState::Extended);
    assert_eq!(h.sim.extension(), ExtensionState::Extended);
    h
}

#[test]
fn small_move_keeps_extension_out() {
    let mut h = at_floor_pickup();
    h.schedule(superstructure::set_pose(Pose::FloorPickupCone));
    let mut ticks = 0;
    while !h.core.is_idle() {
        let frame = h.step();
        assert_eq!(frame.extension, ExtensionState::Extended);
        ticks += 1;
        assert!(ticks < 200);
    }
    assert!((h.sim.arm().angle() - rad(-56.0)).abs() < rad(2.0));
}

#[test]
fn small_move_retracts_only_after_reaching_goal() {
    let mut h = at_floor_pickup();
    h.schedule(superstructure::set_pose(Pose::FloorPickupCone));
    h.run_until_idle(200).unwrap();

    // −56° to −60°: inside the skip tolerance, and the target pose is
    // retracted, so the retract is the last step.
    h.schedule(superstructure::set_pose(Pose::ScoreCubeLow));
    let mut retracted_at_goal = None;
    for _ in 0..200 {
        let frame = h.step();
        if frame.extension == ExtensionState::Retracted {
            retracted_at_goal = Some(h.core.robot().arm.at_goal());
            break;
        }
    }
    assert_eq!(retracted_at_goal, Some(true));
}

#[test]
fn large_move_retracts_before_arm_moves() {
    let mut h = at_floor_pickup();
    let floor = Pose::FloorPickupCube.arm_angle();
    h.schedule(superstructure::stow());

    // Solenoid switches on tick 1; the arm is held for the full settle time.
    for tick in 1..=25 {
        let frame = h.step();
        assert_eq!(frame.extension, ExtensionState::Retracted, "tick {tick}");
        assert!((h.core.robot().arm.goal() - floor).abs() < 1e-9, "tick {tick}");
    }
    h.step();
    assert!((h.core.robot().arm.goal() - Pose::Stow.arm_angle()).abs() < 1e-9);

    let ticks = h.run_until_idle(200);
    assert!(ticks.is_some());
    assert_eq!(h.core.robot().superstructure.last_pose(), Pose::Stow);
}

#[test]
fn arm_released_only_after_full_settle() {
    let mut h = at_floor_pickup();
    let floor = Pose::FloorPickupCube.arm_angle();
    let settle = h.core.robot().extension.settle_time();
    h.schedule(superstructure::stow());

    let mut retracted_at = None;
    let mut released_at = None;
    for tick in 1..=100 {
        let frame = h.step();
        if retracted_at.is_none() && frame.extension == ExtensionState::Retracted {
            retracted_at = Some(tick);
        }
        if (h.core.robot().arm.goal() - floor).abs() > 1e-9 {
            released_at = Some(tick);
            break;
        }
    }

    let (retracted_at, released_at) = (retracted_at.unwrap(), released_at.unwrap());
    assert_eq!(retracted_at, 1);
    let gap = (released_at - retracted_at) as f64 * h.dt();
    assert!(gap + 1e-9 >= settle, "released after {gap:.2} s");
}

#[test]
fn cancel_during_retract_leaves_goal_and_extension() {
    let mut h = at_floor_pickup();
    let floor = Pose::FloorPickupCube.arm_angle();
    h.schedule(superstructure::stow());
    h.run(5);
    h.core.cancel_all();

    for frame in h.run(40) {
        assert_eq!(frame.extension, ExtensionState::Retracted);
    }
    assert!((h.core.robot().arm.goal() - floor).abs() < 1e-9);
    assert_eq!(h.core.robot().superstructure.last_pose(), Pose::FloorPickupCube);
}

#[test]
fn cube_intake_stops_on_stall_and_holds() {
    let mut h = SimHarness::new(Approach::FromNear);
    let task = superstructure::run_intake(h.core.robot());
    h.schedule(task);

    let ticks = h.run_until_idle(200).unwrap();
    // 0.6 s to seat, a few ticks for the filter, 1 s of debounce.
    assert!((70..120).contains(&ticks), "{ticks} ticks");
    assert!(h.sim.has_cube());
    let frame = h.step();
    assert_eq!(frame.intake_speed, -0.1);
}

#[test]
fn cube_score_ejects_at_pose_speed() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.sim.preload_cube();
    h.schedule(superstructure::set_pose(Pose::ScoreCubeMid));
    h.run_until_idle(200).unwrap();

    let task = superstructure::score(h.core.robot());
    h.schedule(task);
    let frame = h.step();
    assert_eq!(frame.intake_speed, 0.5);
    assert!(!h.sim.has_cube());
    assert_eq!(h.run_until_idle(50), Some(24));
    assert_eq!(h.step().intake_speed, 0.0);
}

#[test]
fn cone_score_opens_jaw() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.core
        .robot_mut()
        .superstructure
        .set_game_piece(GamePiece::Cone);
    let task = superstructure::score(h.core.robot());
    h.schedule(task);
    let frame = h.step();
    assert!(frame.intake_open);
    assert_eq!(frame.intake_speed, 0.0);
    assert!(h.core.is_idle());
}

#[test]
fn bump_then_reset_returns_to_pose() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.schedule(superstructure::set_pose(Pose::ScoreCubeMid));
    h.run_until_idle(200).unwrap();

    h.schedule(superstructure::bump_up());
    h.run_until_idle(100).unwrap();
    assert!((h.core.robot().arm.goal() - rad(-23.0)).abs() < 1e-9);

    h.schedule(superstructure::reset_arm_state());
    h.run_until_idle(100).unwrap();
    assert!((h.core.robot().arm.goal() - rad(-26.0)).abs() < 1e-9);
    assert!((h.sim.arm().angle() - rad(-26.0)).abs() < rad(2.0));
}
