//! PID controller with backward Euler integration, derivative filter (Tf),
//! and anti-windup via back-calculation (Tt).
//!
//! Zero Ki disables integral; zero Kd disables derivative. The derivative is
//! taken on the error and suppressed on the first call after a reset, so a
//! goal jump never produces a derivative kick.
//!
//! When the PID output is summed with other terms before the actuator clamp,
//! the caller reports the feedback share that was actually applied through
//! [`PidState::track_applied`]; back-calculation then tracks the real
//! saturation instead of `out_max`.

use sst_common::robot::config::ArmConfig;

/// Internal state of the PID controller.
///
/// Must be reset (via [`PidState::reset`]) whenever the loop is re-seeded,
/// e.g. while the robot is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    integral: f64,
    /// Previous error; `None` right after a reset.
    prev_error: Option<f64>,
    derivative_filtered: f64,
    /// Previous raw (unsaturated) output, for anti-windup.
    prev_raw_output: f64,
    /// Feedback share of the previous output that reached the actuator.
    prev_applied_output: f64,
}

impl PidState {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Record the part of the last output that survived the caller's output
    /// stage. Overrides the `out_max` clamp for the next back-calculation.
    #[inline]
    pub fn track_applied(&mut self, applied: f64) {
        self.prev_applied_output = applied;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain [V/rad].
    pub kp: f64,
    /// Integral gain (0 = disabled).
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
    /// Derivative filter time constant [s] (0 = unfiltered).
    pub tf: f64,
    /// Anti-windup tracking time constant [s] (0 = disabled).
    pub tt: f64,
    /// Output saturation limit [V] of the feedback term alone. Anti-windup
    /// uses it unless the caller reports the applied output.
    pub out_max: f64,
}

impl PidGains {
    /// Arm feedback gains, saturating at the supply voltage.
    pub fn from_arm(config: &ArmConfig, supply_voltage: f64) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            tf: config.derivative_filter_s,
            tt: config.anti_windup_s,
            out_max: supply_voltage,
        }
    }
}

/// Compute one PID cycle.
///
/// # Arguments
/// - `error`: setpoint − measurement.
/// - `dt`: tick period [s].
///
/// # Returns
/// Unsaturated PID output; clamping happens in the caller's output stage.
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidGains, error: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }

    let p_term = gains.kp * error;

    let i_term = if gains.ki != 0.0 {
        let anti_windup = if gains.tt > 0.0 {
            (state.prev_applied_output - state.prev_raw_output) / gains.tt
        } else {
            0.0
        };
        state.integral += (gains.ki * error + anti_windup) * dt;
        state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    let d_term = match state.prev_error {
        Some(prev) if gains.kd != 0.0 => {
            let raw_derivative = (error - prev) / dt;
            if gains.tf > 0.0 {
                let alpha = dt / (gains.tf + dt);
                state.derivative_filtered += alpha * (raw_derivative - state.derivative_filtered);
                gains.kd * state.derivative_filtered
            } else {
                gains.kd * raw_derivative
            }
        }
        _ => {
            state.derivative_filtered = 0.0;
            0.0
        }
    };

    state.prev_error = Some(error);

    let raw_output = p_term + i_term + d_term;
    state.prev_raw_output = raw_output;
    state.prev_applied_output = if gains.out_max > 0.0 {
        raw_output.clamp(-gains.out_max, gains.out_max)
    } else {
        raw_output
    };
    raw_output
}

// ─── Tests ──────────────────────────────────────────────────────────
