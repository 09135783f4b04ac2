//! Trapezoidal motion profile.
//!
//! Stateless: every call plans a fresh minimum-time profile from the given
//! state to `{goal, 0}` and samples it `dt` later. Feeding the returned
//! setpoint back in as the next `current` makes the profile re-entrant: a
//! changed goal simply yields a new feasible profile from where the setpoint
//! already is.
//!
//! Planning happens in a direction-normalized frame (goal above current), so
//! moves up and down are mirror images of each other.
//!
//! A goal that lands inside the current stopping distance cannot be reached
//! without overshooting. The setpoint then brakes at the acceleration limit,
//! passes the goal and comes back on the next plan.

/// Velocity and acceleration limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileConstraints {
    /// Cruise velocity [units/s], > 0.
    pub max_velocity: f64,
    /// Acceleration and deceleration magnitude [units/s²], > 0.
    pub max_acceleration: f64,
}

/// Position/velocity pair emitted each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSetpoint {
    pub position: f64,
    pub velocity: f64,
}

impl MotionSetpoint {
    #[inline]
    pub const fn at_rest(position: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    #[inline]
    fn directed(self, direction: f64) -> Self {
        Self {
            position: self.position * direction,
            velocity: self.velocity * direction,
        }
    }
}

/// Current state closer to the goal than this is treated as arrived.
const ARRIVAL_EPSILON: f64 = 1e-9;

/// Stopping-distance excess [units] below which braking onto the goal still
/// counts as feasible.
const OVERSHOOT_EPSILON: f64 = 1e-9;

/// Phase boundary times of one planned profile, measured from "now".
#[derive(Debug, Clone, Copy)]
struct ProfilePlan {
    direction: f64,
    start: MotionSetpoint,
    goal: f64,
    end_accel: f64,
    end_full_speed: f64,
    end_decel: f64,
}

fn plan(c: &ProfileConstraints, current: MotionSetpoint, goal_position: f64) -> ProfilePlan {
    let direction = if current.position > goal_position { -1.0 } else { 1.0 };
    let mut start = current.directed(direction);
    let goal = goal_position * direction;

    if start.velocity > c.max_velocity {
        start.velocity = c.max_velocity;
    }

    // Distance the current velocity would have covered had it been reached
    // from rest; lets the plan treat the move as a truncated full trapezoid.
    let cutoff_begin = start.velocity / c.max_acceleration;
    let cutoff_dist_begin = cutoff_begin * cutoff_begin * c.max_acceleration / 2.0;

    let full_trap_dist = cutoff_dist_begin + (goal - start.position);
    let mut accel_time = c.max_velocity / c.max_acceleration;
    let mut full_speed_dist = full_trap_dist - accel_time * accel_time * c.max_acceleration;

    // Triangular profile: cruise velocity never reached.
    if full_speed_dist < 0.0 {
        accel_time = (full_trap_dist.max(0.0) / c.max_acceleration).sqrt();
        full_speed_dist = 0.0;
    }

    let end_accel = accel_time - cutoff_begin;
    let end_full_speed = end_accel + full_speed_dist / c.max_velocity;
    let end_decel = end_full_speed + accel_time;

    ProfilePlan {
        direction,
        start,
        goal,
        end_accel,
        end_full_speed,
        end_decel,
    }
}

impl ProfilePlan {
    /// Moving toward the goal too fast to stop on it.
    fn overshoots(&self, c: &ProfileConstraints) -> bool {
        let v = self.start.velocity;
        let stopping = v * v / (2.0 * c.max_acceleration);
        v > 0.0 && stopping > self.goal - self.start.position + OVERSHOOT_EPSILON
    }
}

/// Advance the profile by `dt` from `current` toward `{goal_position, 0}`.
///
/// # Returns
/// The setpoint `dt` seconds into the freshly planned profile; exactly
/// `{goal_position, 0}` once the profile has run out.
pub fn profile_advance(
    constraints: &ProfileConstraints,
    current: MotionSetpoint,
    goal_position: f64,
    dt: f64,
) -> MotionSetpoint {
    if (current.position - goal_position).abs() < ARRIVAL_EPSILON
        && current.velocity.abs() < ARRIVAL_EPSILON
    {
        return MotionSetpoint::at_rest(goal_position);
    }

    let p = plan(constraints, current, goal_position);
    let a = constraints.max_acceleration;
    let t = dt;
    let mut result = p.start;

    if p.overshoots(constraints) {
        result.velocity -= t * a;
        result.position += (p.start.velocity - t * a / 2.0) * t;
        return result.directed(p.direction);
    }

    if t < p.end_accel {
        result.velocity += t * a;
        result.position += (p.start.velocity + t * a / 2.0) * t;
    } else if t < p.end_full_speed {
        result.velocity = constraints.max_velocity;
        result.position += (p.start.velocity + p.end_accel * a / 2.0) * p.end_accel
            + constraints.max_velocity * (t - p.end_accel);
    } else if t <= p.end_decel {
        let time_left = p.end_decel - t;
        result.velocity = time_left * a;
        result.position = p.goal - (time_left * a / 2.0) * time_left;
    } else {
        return MotionSetpoint::at_rest(goal_position);
    }

    result.directed(p.direction)
}

/// Time [s] the profile needs from `current` to come to rest at `goal_position`.
pub fn profile_total_time(
    constraints: &ProfileConstraints,
    current: MotionSetpoint,
    goal_position: f64,
) -> f64 {
    if (current.position - goal_position).abs() < ARRIVAL_EPSILON
        && current.velocity.abs() < ARRIVAL_EPSILON
    {
        return 0.0;
    }
    let p = plan(constraints, current, goal_position);
    if p.overshoots(constraints) {
        // Brake to rest past the goal, then a fresh move back.
        let a = constraints.max_acceleration;
        let stop = p.start.position + p.start.velocity * p.start.velocity / (2.0 * a);
        let back = MotionSetpoint::at_rest(stop * p.direction);
        return p.start.velocity / a + profile_total_time(constraints, back, goal_position);
    }
    p.end_decel.max(0.0)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f64 = 0.02;
    const C: ProfileConstraints = ProfileConstraints {
        max_velocity: 3.0,
        max_acceleration: 6.0,
    };

    fn run_to_goal(start: f64, goal: f64, max_ticks: usize) -> Vec<MotionSetpoint> {
        let mut sp = MotionSetpoint::at_rest(start);
        let mut out = vec![sp];
        for _ in 0..max_ticks {
            sp = profile_advance(&C, sp, goal, DT);
            out.push(sp);
            if sp == MotionSetpoint::at_rest(goal) {
                break;
            }
        }
        out
    }

    #[test]
    fn at_goal_holds_at_rest() {
        let sp = profile_advance(&C, MotionSetpoint::at_rest(0.5), 0.5, DT);
        assert_eq!(sp, MotionSetpoint::at_rest(0.5));
        assert_eq!(profile_total_time(&C, MotionSetpoint::at_rest(0.5), 0.5), 0.0);
    }

    #[test]
    fn first_tick_accelerates_at_limit() {
        let sp = profile_advance(&C, MotionSetpoint::at_rest(0.0), 2.0, DT);
        assert!((sp.velocity - 6.0 * DT).abs() < 1e-12);
        assert!((sp.position - 0.5 * 6.0 * DT * DT).abs() < 1e-12);
    }

    #[test]
    fn velocity_and_acceleration_limits_hold() {
        for (start, goal) in [(-1.4, 0.09), (0.09, -1.5), (-0.9, -0.45), (0.0, 0.001)] {
            let trace = run_to_goal(start, goal, 1000);
            for pair in trace.windows(2) {
                let dv = (pair[1].velocity - pair[0].velocity).abs();
                assert!(pair[1].velocity.abs() <= C.max_velocity + 1e-9);
                assert!(dv <= C.max_acceleration * DT + 1e-9, "dv={dv}");
            }
            assert_eq!(*trace.last().unwrap(), MotionSetpoint::at_rest(goal));
        }
    }

    #[test]
    fn never_overshoots() {
        let trace = run_to_goal(-1.4, -0.45, 1000);
        assert!(trace.iter().all(|sp| sp.position <= -0.45 + 1e-12));
        assert!(trace.iter().all(|sp| sp.velocity >= -1e-12));

        let trace = run_to_goal(0.2, -1.2, 1000);
        assert!(trace.iter().all(|sp| sp.position >= -1.2 - 1e-12));
    }

    #[test]
    fn downward_move_mirrors_upward() {
        let up = profile_advance(&C, MotionSetpoint::at_rest(0.0), 1.0, DT);
        let down = profile_advance(&C, MotionSetpoint::at_rest(0.0), -1.0, DT);
        assert!((up.position + down.position).abs() < 1e-12);
        assert!((up.velocity + down.velocity).abs() < 1e-12);
    }

    #[test]
    fn long_move_reaches_cruise() {
        let trace = run_to_goal(-1.5, 1.2, 1000);
        let peak = trace.iter().map(|sp| sp.velocity).fold(0.0, f64::max);
        assert!((peak - C.max_velocity).abs() < 1e-12);
    }

    #[test]
    fn total_time_matches_sampled_duration() {
        let start = MotionSetpoint::at_rest(-80f64.to_radians());
        let goal = -26f64.to_radians();
        let expected = profile_total_time(&C, start, goal);
        let ticks = run_to_goal(start.position, goal, 1000).len() - 1;
        let sampled = ticks as f64 * DT;
        assert!((sampled - expected).abs() <= DT + 1e-9, "{sampled} vs {expected}");
        assert!(expected <= (goal - start.position).abs() / C.max_velocity
            + C.max_velocity / C.max_acceleration);
    }

    #[test]
    fn goal_change_mid_move_replans() {
        let mut sp = MotionSetpoint::at_rest(0.0);
        for _ in 0..10 {
            sp = profile_advance(&C, sp, 1.0, DT);
        }
        assert!(sp.velocity > 0.0);
        // Reverse: velocity may only fall by one acceleration step per tick.
        let next = profile_advance(&C, sp, -1.0, DT);
        assert!((sp.velocity - next.velocity) <= C.max_acceleration * DT + 1e-9);
        let mut sp = next;
        for _ in 0..1000 {
            sp = profile_advance(&C, sp, -1.0, DT);
        }
        assert_eq!(sp, MotionSetpoint::at_rest(-1.0));
    }

    #[test]
    fn goal_inside_stopping_distance_brakes_and_returns() {
        let mut sp = MotionSetpoint::at_rest(0.0);
        for _ in 0..20 {
            sp = profile_advance(&C, sp, 2.0, DT);
        }
        assert!((sp.velocity - 2.4).abs() < 1e-9);
        // Needs 0.48 rad to stop; the new goal is 0.12 rad ahead.
        let goal = 0.6;
        let expected = profile_total_time(&C, sp, goal);

        let mut ticks = 0;
        let mut peak = sp.position;
        while sp != MotionSetpoint::at_rest(goal) {
            let next = profile_advance(&C, sp, goal, DT);
            let dv = (next.velocity - sp.velocity).abs();
            assert!(dv <= C.max_acceleration * DT + 1e-9, "dv={dv}");
            if sp.velocity > 1e-9 {
                assert!(next.position > sp.position, "backward step at {sp:?}");
            }
            peak = peak.max(next.position);
            sp = next;
            ticks += 1;
            assert!(ticks < 500);
        }
        assert!((peak - (0.48 + 2.4 * 2.4 / 12.0)).abs() < 0.05, "peak {peak}");
        assert!((ticks as f64 * DT - expected).abs() <= DT + 1e-9);
    }

    #[test]
    fn braking_onto_goal_ends_exactly_at_rest() {
        // Exactly one stopping distance away: an ordinary deceleration.
        let sp = MotionSetpoint {
            position: 0.0,
            velocity: 1.2,
        };
        let goal = 1.2 * 1.2 / (2.0 * C.max_acceleration);
        let trace: Vec<_> = std::iter::successors(Some(sp), |s| {
            (*s != MotionSetpoint::at_rest(goal)).then(|| profile_advance(&C, *s, goal, DT))
        })
        .take(100)
        .collect();
        assert_eq!(*trace.last().unwrap(), MotionSetpoint::at_rest(goal));
        assert!(trace.iter().all(|s| s.position <= goal + 1e-12));
    }

    proptest! {
        #[test]
        fn random_goal_changes_stay_within_limits(
            start in -1.5f64..1.5,
            schedule in prop::collection::vec((1usize..60, -1.6f64..1.6), 1..8),
        ) {
            let mut sp = MotionSetpoint::at_rest(start);
            for &(ticks, goal) in &schedule {
                for _ in 0..ticks {
                    let next = profile_advance(&C, sp, goal, DT);
                    prop_assert!(next.velocity.abs() <= C.max_velocity + 1e-9);
                    let dv = (next.velocity - sp.velocity).abs();
                    let dp = (next.position - sp.position).abs();
                    prop_assert!(dv <= C.max_acceleration * DT + 1e-9, "dv={}", dv);
                    prop_assert!(dp <= C.max_velocity * DT + 1e-9, "dp={}", dp);
                    sp = next;
                }
            }

            let (_, goal) = schedule[schedule.len() - 1];
            for _ in 0..1000 {
                sp = profile_advance(&C, sp, goal, DT);
            }
            prop_assert_eq!(sp, MotionSetpoint::at_rest(goal));
        }
    }
}
