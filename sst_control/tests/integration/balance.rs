//! Auto-balance on the simulated charge station.

use sst_common::robot::fault::Faults;
use sst_control::balance::{self, BalancePhase};
use sst_control::command::TaskExt;
use sst_control::sim::charge_station::Approach;

use super::SimHarness;

/// Run `ticks` ticks and collect the distinct balance phases in order.
fn phases(h: &mut SimHarness, ticks: usize) -> Vec<BalancePhase> {
    let mut seen = Vec::new();
    for _ in 0..ticks {
        h.step();
        if let Some(p) = h.core.telemetry().balance_phase {
            if seen.last() != Some(&p) {
                seen.push(p);
            }
        }
    }
    seen
}

#[test]
fn forward_balance_levels_the_station() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.schedule(balance::balance_forward().boxed());
    let seen = phases(&mut h, 600);
    assert_eq!(
        seen,
        vec![
            BalancePhase::Approach,
            BalancePhase::Decelerate,
            BalancePhase::Hold
        ]
    );
    let pitch = h.core.telemetry().pitch_deg.unwrap();
    assert!(pitch.abs() <= 5.0, "pitch {pitch}");
    assert!(h.sim.station().on_platform());
    // Still running: balance never finishes on its own.
    assert_eq!(h.core.active_tasks(), vec!["balance-forward"]);
}

#[test]
fn backward_balance_levels_the_station() {
    let mut h = SimHarness::new(Approach::FromFar);
    h.schedule(balance::balance_backward().boxed());
    let seen = phases(&mut h, 600);
    assert_eq!(seen.last(), Some(&BalancePhase::Hold));
    let pitch = h.core.telemetry().pitch_deg.unwrap();
    assert!(pitch.abs() <= 5.0, "pitch {pitch}");
}

#[test]
fn pitch_dropout_stops_drive_and_resumes() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.schedule(balance::balance_forward().boxed());
    for frame in h.run(10) {
        assert_eq!(frame.drive_left_volts, 3.0);
    }

    h.sim.inject_faults(Faults::PITCH_SENSOR);
    for frame in h.run(10) {
        assert_eq!((frame.drive_left_volts, frame.drive_right_volts), (0.0, 0.0));
        let t = h.core.telemetry();
        assert_eq!(t.pitch_deg, None);
        assert!(t.faults.contains(Faults::PITCH_SENSOR));
        assert_eq!(t.balance_phase, Some(BalancePhase::Approach));
    }

    h.sim.clear_faults(Faults::PITCH_SENSOR);
    assert_eq!(h.step().drive_left_volts, 3.0);
    let seen = phases(&mut h, 800);
    assert_eq!(seen.last(), Some(&BalancePhase::Hold));
    assert!(h.core.telemetry().latched_faults.contains(Faults::PITCH_SENSOR));
}

#[test]
fn canceling_balance_zeroes_drive_same_tick() {
    let mut h = SimHarness::new(Approach::FromNear);
    h.schedule(balance::balance_forward().boxed());
    h.run(5);
    h.core.cancel_all();
    let (left, right) = h.core.robot().drivetrain.voltages();
    assert_eq!((left, right), (0.0, 0.0));
    assert_eq!(h.core.robot().balance_phase, None);
    let frame = h.step();
    assert_eq!(frame.drive_left_volts, 0.0);
}
