//! End-to-end scenarios through the full tick pipeline.

use sst_common::robot::config::CoreConfig;
use sst_common::robot::io::{RobotMode, SensorFrame, TickInput};
use sst_common::robot::pose::{ExtensionState, Pose};
use sst_control::balance::{self, BalancePhase};
use sst_control::command::TaskExt;
use sst_control::control::profile::profile_total_time;
use sst_control::cycle::ControlCore;
use sst_control::routines::{self, AutoRoutine};
use sst_control::sim::charge_station::Approach;
use sst_control::superstructure;

use super::{SimHarness, rad};

#[test]
fn stow_to_mid_cube_within_profile_time() {
    let mut h = SimHarness::new(Approach::FromFar);
    let robot = h.core.robot();
    let bound = profile_total_time(
        robot.arm.constraints(),
        robot.arm.setpoint(),
        Pose::ScoreCubeMid.arm_angle(),
    );
    // 54° at 3 rad/s with 0.5 s of ramps.
    assert!((bound - 0.814).abs() < 0.01, "bound {bound}");

    h.schedule(superstructure::set_pose(Pose::ScoreCubeMid));
    let mut frames = Vec::new();
    while !h.core.is_idle() {
        frames.push(h.step());
        assert!(frames.len() < 200, "pose never reached");
    }

    let elapsed = frames.len() as f64 * h.dt();
    assert!(elapsed <= bound + 0.2, "took {elapsed:.2} s");
    // Already retracted and the cube-mid pose is retracted: no extend.
    assert!(frames.iter().all(|f| f.extension == ExtensionState::Retracted));
    assert!((h.sim.arm().angle() - rad(-26.0)).abs() < rad(2.0));
    assert_eq!(h.core.robot().superstructure.last_pose(), Pose::ScoreCubeMid);
    assert!(h.core.robot().arm.at_goal());
}

#[test]
fn balance_forward_step_pitch_trips_after_debounce() {
    let mut core = ControlCore::new(CoreConfig::default()).unwrap();
    let tick = |core: &mut ControlCore, pitch: f64| {
        core.tick(&TickInput::new(
            RobotMode::Autonomous,
            SensorFrame::complete(rad(-80.0), 0.0, pitch, 0.0),
        ))
    };
    tick(&mut core, 0.0);
    core.schedule(balance::balance_forward().boxed());

    // Pitch steps to 16° with the first balance tick; the 0.75 s window
    // trips on the 39th consecutive sample, one tick after t + 0.75 s.
    for n in 1..=38 {
        let frame = tick(&mut core, 16.0);
        assert_eq!(frame.drive_left_volts, 3.0, "tick {n}");
        assert_eq!(core.telemetry().balance_phase, Some(BalancePhase::Approach));
    }
    let frame = tick(&mut core, 16.0);
    assert_eq!(frame.drive_left_volts, 1.0);
    assert_eq!(core.telemetry().balance_phase, Some(BalancePhase::Decelerate));

    // Rest of the one-second decelerate segment.
    for _ in 0..49 {
        assert_eq!(tick(&mut core, 16.0).drive_left_volts, 1.0);
    }
    // Creep until the pitch falls faster than 15°/s for 0.05 s.
    assert_eq!(tick(&mut core, 16.0).drive_left_volts, 0.75);
    for pitch in [15.0, 14.0, 13.0] {
        assert_eq!(tick(&mut core, pitch).drive_left_volts, 0.75);
    }
    assert_eq!(tick(&mut core, 12.0).drive_left_volts, 0.5);
    assert_eq!(core.telemetry().balance_phase, Some(BalancePhase::Hold));

    // Hold output changes sign only across the ±5° deadband.
    let pitches = [10.0, 6.0, 4.0, 0.0, -4.0, -6.0, -10.0, -4.0, 6.0];
    let expected = [0.5, 0.5, 0.0, 0.0, 0.0, -0.5, -0.5, 0.0, 0.5];
    for (pitch, volts) in pitches.into_iter().zip(expected) {
        let frame = tick(&mut core, pitch);
        assert_eq!(frame.drive_left_volts, volts, "pitch {pitch}");
        assert_eq!(frame.drive_right_volts, volts);
    }
}

#[test]
fn mid_cube_balance_routine_scores_then_levels() {
    let mut h = SimHarness::new(Approach::FromFar);
    h.sim.preload_cube();
    let task = routines::build(AutoRoutine::MidCubeBalance, h.core.robot());
    h.schedule(task);

    let mut phases = Vec::new();
    for _ in 0..750 {
        h.step();
        let phase = h.core.telemetry().balance_phase;
        if let Some(p) = phase {
            if phases.last() != Some(&p) {
                phases.push(p);
            }
        }
    }

    assert!(!h.sim.has_cube());
    assert_eq!(
        phases,
        vec![
            BalancePhase::Approach,
            BalancePhase::Decelerate,
            BalancePhase::Hold
        ]
    );
    let t = h.core.telemetry();
    assert_eq!(t.last_pose, Pose::Stow);
    let pitch = t.pitch_deg.unwrap();
    assert!(pitch.abs() <= 5.0, "pitch {pitch}");
    assert!(h.sim.station().on_platform());
}

#[test]
fn drive_back_reverses_then_stops() {
    let mut h = SimHarness::new(Approach::FromFar);
    let start = h.sim.station().position();
    h.schedule(routines::build(AutoRoutine::DriveBack, h.core.robot()));
    let ticks = h.run_until_idle(300).unwrap();
    assert_eq!(ticks, 175);
    assert!(start - h.sim.station().position() > 3.5);
    let frame = h.step();
    assert_eq!((frame.drive_left_volts, frame.drive_right_volts), (0.0, 0.0));
}

#[test]
fn disable_mid_routine_cancels_and_reenable_is_smooth() {
    let mut h = SimHarness::new(Approach::FromFar);
    h.sim.preload_cube();
    h.schedule(routines::build(AutoRoutine::MidCubeDriveBack, h.core.robot()));
    h.run(20);
    assert!(!h.core.is_idle());

    h.sim.set_mode(RobotMode::Disabled);
    let frame = h.step();
    assert!(h.core.is_idle());
    assert_eq!(frame.arm_volts, 0.0);
    assert_eq!(frame.drive_left_volts, 0.0);
    assert_eq!(frame.intake_speed, 0.0);
    assert_eq!(h.core.robot().arm.goal(), Pose::Stow.arm_angle());
    h.run(10);

    h.sim.set_mode(RobotMode::Autonomous);
    let measured = h.sim.arm().angle();
    let frame = h.step();
    let setpoint = h.core.robot().arm.setpoint();
    assert!((setpoint.position - measured).abs() < rad(1.0));
    assert!(frame.arm_volts.abs() < 3.0, "{} V on enable", frame.arm_volts);
}

#[test]
fn status_color_follows_mode_alliance_and_piece() {
    use sst_common::robot::io::Alliance;
    use sst_common::robot::pose::GamePiece;
    use sst_control::health::StatusColor;

    let mut h = SimHarness::new(Approach::FromNear);
    assert_eq!(h.core.telemetry().status_color, StatusColor::Red);

    h.step();
    assert_eq!(h.core.telemetry().status_color, StatusColor::Purple);

    h.core
        .robot_mut()
        .superstructure
        .set_game_piece(GamePiece::Cone);
    h.step();
    assert_eq!(h.core.telemetry().status_color, StatusColor::Yellow);

    h.core.robot_mut().status.set_brake_display(true);
    h.step();
    assert_eq!(h.core.telemetry().status_color, StatusColor::Green);

    h.sim.set_mode(RobotMode::Disabled);
    h.sim.set_alliance(Some(Alliance::Blue));
    h.step();
    assert_eq!(h.core.telemetry().status_color, StatusColor::Blue);
}
