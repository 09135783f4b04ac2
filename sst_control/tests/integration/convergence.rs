//! Closed-loop arm behavior against the simulated plant.
//!
//! The plant's gravity term is heavier than the controller's feedforward, so
//! convergence relies on the feedback path.

use sst_common::robot::pose::Pose;
use sst_control::command::TaskExt;
use sst_control::mechanism::arm;
use sst_control::sim::charge_station::Approach;

use super::{SimHarness, rad};

#[test]
fn every_pose_converges_from_stow() {
    for pose in Pose::ALL {
        let mut h = SimHarness::new(Approach::FromNear);
        h.schedule(arm::set_goal_until_at_goal(pose.arm_angle()).boxed());
        let ticks = h.run_until_idle(300);
        assert!(ticks.is_some(), "{pose} never reached");

        // Default hold keeps it there.
        h.run(50);
        assert!(h.core.robot().arm.at_goal(), "{pose} drifted");
        let error = (h.sim.arm().angle() - pose.arm_angle()).abs();
        assert!(error < rad(2.0), "{pose} off by {:.2}°", error.to_degrees());
    }
}

#[test]
fn setpoints_respect_profile_limits() {
    for goal_deg in [-26.0, 5.0, 60.0, -85.0] {
        let mut h = SimHarness::new(Approach::FromNear);
        let constraints = *h.core.robot().arm.constraints();
        h.core.robot_mut().arm.set_goal(rad(goal_deg));

        let mut previous = h.core.robot().arm.setpoint();
        for _ in 0..200 {
            h.step();
            let sp = h.core.robot().arm.setpoint();
            assert!(sp.velocity.abs() <= constraints.max_velocity + 1e-9);
            let accel = (sp.velocity - previous.velocity).abs() / h.dt();
            assert!(
                accel <= constraints.max_acceleration + 1e-6,
                "goal {goal_deg}: accel {accel}"
            );
            previous = sp;
        }
        assert!((previous.position - rad(goal_deg)).abs() < 1e-12);
        assert_eq!(previous.velocity, 0.0);
    }
}

#[test]
fn goal_changes_mid_move_keep_setpoints_feasible() {
    let mut h = SimHarness::new(Approach::FromNear);
    let constraints = *h.core.robot().arm.constraints();
    let max_dv = constraints.max_acceleration * h.dt() + 1e-9;

    // Cruise up, then a goal well inside the stopping distance, then a
    // reversal while still braking past it.
    let schedule = [(60.0, 20), (-45.0, 6), (-70.0, 15), (-26.0, 250)];
    let mut previous = h.core.robot().arm.setpoint();
    for (goal_deg, ticks) in schedule {
        h.core.robot_mut().arm.set_goal(rad(goal_deg));
        for _ in 0..ticks {
            h.step();
            let sp = h.core.robot().arm.setpoint();
            assert!(sp.velocity.abs() <= constraints.max_velocity + 1e-9);
            let dv = (sp.velocity - previous.velocity).abs();
            assert!(dv <= max_dv, "goal {goal_deg}: dv {dv}");
            previous = sp;
        }
    }

    assert!(h.core.robot().arm.at_goal());
    assert!((h.sim.arm().angle() - rad(-26.0)).abs() < rad(2.0));
}

#[test]
fn repeated_goal_requests_do_not_change_output() {
    let goal = rad(-26.0);

    let mut once = SimHarness::new(Approach::FromNear);
    once.core.robot_mut().arm.set_goal(goal);
    once.run(200);

    let mut every_tick = SimHarness::new(Approach::FromNear);
    every_tick.schedule(arm::continuous_goal(move |_| goal).boxed());
    every_tick.run(200);

    let a = once.core.robot().arm.voltage();
    let b = every_tick.core.robot().arm.voltage();
    assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    assert!(once.core.robot().arm.at_goal());
}

#[test]
fn arm_encoder_dropout_holds_voltage() {
    use sst_common::robot::fault::Faults;

    let mut h = SimHarness::new(Approach::FromNear);
    h.core.robot_mut().arm.set_goal(rad(-26.0));
    h.run(60);
    let held = h.step().arm_volts;

    h.sim.inject_faults(Faults::ARM_POSITION_SENSOR);
    for _ in 0..5 {
        let frame = h.step();
        assert_eq!(frame.arm_volts, held);
        assert!(!h.core.robot().arm.at_goal());
        let t = h.core.telemetry();
        assert!(t.faults.contains(Faults::ARM_POSITION_SENSOR));
        assert!(t.arm_degraded);
    }

    h.sim.clear_faults(Faults::ARM_POSITION_SENSOR);
    h.run(50);
    let t = h.core.telemetry();
    assert!(t.faults.is_empty());
    assert!(t.latched_faults.contains(Faults::ARM_POSITION_SENSOR));
    assert!(!t.arm_degraded);
    assert!(t.arm_at_goal);
}
