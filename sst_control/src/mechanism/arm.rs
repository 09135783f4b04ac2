//! Arm controller.
//!
//! Output pipeline, once per tick:
//!
//! ```text
//! goal ─► profile ─► setpoint ─┬─► PID(setpoint.position − measured) ─┐
//!                              └─► feedforward(setpoint, accel) ──────┴─► clamp(±supply) ─► volts
//! ```
//!
//! The profile recursion state is the previous setpoint. While the robot is
//! disabled it is re-seeded from the measured angle every tick, so enabling
//! never produces a step.

use core::f64::consts::{PI, TAU};

use sst_common::config::ConfigError;
use sst_common::robot::config::{ArmConfig, CycleConfig};
use sst_common::robot::pose::Pose;
use tracing::warn;

use crate::command::task::{Requirements, Task, TaskStatus};
use crate::control::feedforward::{ArmFeedforwardGains, arm_feedforward};
use crate::control::pid::{PidGains, PidState, pid_compute};
use crate::control::profile::{MotionSetpoint, ProfileConstraints, profile_advance};
use crate::robot::Robot;

/// Setpoint closer to the goal than this counts as the terminal setpoint.
const TERMINAL_EPSILON: f64 = 1e-9;

/// Wrap an angle into [−π, π).
#[inline]
pub fn angle_modulus(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[derive(Debug, Clone)]
pub struct ArmController {
    pid_gains: PidGains,
    pid: PidState,
    ff_gains: ArmFeedforwardGains,
    constraints: ProfileConstraints,
    position_tolerance: f64,
    velocity_tolerance: f64,
    supply_voltage: f64,
    dt: f64,

    goal: f64,
    setpoint: MotionSetpoint,

    position: Option<f64>,
    velocity: Option<f64>,

    voltage: f64,
    saturated: bool,
    degraded: bool,

    tick: u64,
    last_update_tick: Option<u64>,
}

impl ArmController {
    /// Build the controller with goal and setpoint at stow.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` for non-positive limits or tolerances.
    pub fn new(arm: &ArmConfig, cycle: &CycleConfig) -> Result<Self, ConfigError> {
        arm.validate()?;
        cycle.validate()?;

        let stow = Pose::Stow.arm_angle();
        Ok(Self {
            pid_gains: PidGains::from_arm(arm, cycle.supply_voltage),
            pid: PidState::default(),
            ff_gains: ArmFeedforwardGains::from_arm(arm),
            constraints: ProfileConstraints {
                max_velocity: arm.max_velocity,
                max_acceleration: arm.max_acceleration,
            },
            position_tolerance: arm.position_tolerance_deg.to_radians(),
            velocity_tolerance: arm.velocity_tolerance_deg_s.to_radians(),
            supply_voltage: cycle.supply_voltage,
            dt: cycle.tick_period_s,
            goal: stow,
            setpoint: MotionSetpoint::at_rest(stow),
            position: None,
            velocity: None,
            voltage: 0.0,
            saturated: false,
            degraded: false,
            tick: 0,
            last_update_tick: None,
        })
    }

    /// Take this tick's encoder readings.
    pub fn ingest(&mut self, tick: u64, position: Option<f64>, velocity: Option<f64>) {
        self.tick = tick;
        self.position = position;
        self.velocity = velocity;
    }

    /// Set the goal angle [rad]. Output changes only on the next `update()`.
    #[inline]
    pub fn set_goal(&mut self, angle: f64) {
        self.goal = angle_modulus(angle);
    }

    /// Advance the profile and recompute the output voltage.
    ///
    /// Runs at most once per tick; further calls in the same tick are
    /// ignored. Without a position reading the previous voltage is held, the
    /// profile does not advance and the controller reports degraded.
    pub fn update(&mut self) {
        if self.last_update_tick == Some(self.tick) {
            return;
        }
        self.last_update_tick = Some(self.tick);

        let Some(measured) = self.position else {
            if !self.degraded {
                warn!(
                    "arm position unavailable; holding {:.2} V toward goal {:.1}°",
                    self.voltage,
                    self.goal.to_degrees()
                );
            }
            self.degraded = true;
            return;
        };
        self.degraded = false;

        let previous = self.setpoint;
        self.setpoint = profile_advance(&self.constraints, previous, self.goal, self.dt);
        let acceleration = (self.setpoint.velocity - previous.velocity) / self.dt;

        let feedback = pid_compute(
            &mut self.pid,
            &self.pid_gains,
            self.setpoint.position - measured,
            self.dt,
        );
        let feedforward = arm_feedforward(
            &self.ff_gains,
            self.setpoint.position,
            self.setpoint.velocity,
            acceleration,
        );

        let raw = feedback + feedforward;
        self.saturated = raw.abs() > self.supply_voltage;
        self.voltage = raw.clamp(-self.supply_voltage, self.supply_voltage);
        self.pid.track_applied(self.voltage - feedforward);
    }

    /// True when the profile has reached the goal and the measured state is
    /// within tolerance of it. The velocity check is skipped without a
    /// velocity reading; without a position reading this is always false.
    pub fn at_goal(&self) -> bool {
        let Some(measured) = self.position else {
            return false;
        };
        if self.degraded {
            return false;
        }
        let terminal = (self.setpoint.position - self.goal).abs() < TERMINAL_EPSILON
            && self.setpoint.velocity.abs() < TERMINAL_EPSILON;
        let position_ok = (self.setpoint.position - measured).abs() <= self.position_tolerance;
        let velocity_ok = self
            .velocity
            .is_none_or(|v| (self.setpoint.velocity - v).abs() <= self.velocity_tolerance);
        terminal && position_ok && velocity_ok
    }

    /// Re-seed the profile and feedback from the measured angle; output off.
    pub fn reset_to_measurement(&mut self) {
        self.pid.reset();
        if let Some(p) = self.position {
            self.setpoint = MotionSetpoint::at_rest(p);
        }
        self.voltage = 0.0;
        self.saturated = false;
    }

    pub fn goal(&self) -> f64 {
        self.goal
    }

    pub fn setpoint(&self) -> MotionSetpoint {
        self.setpoint
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Last valid position reading this tick [rad].
    pub fn position(&self) -> Option<f64> {
        self.position
    }

    pub fn velocity(&self) -> Option<f64> {
        self.velocity
    }

    /// The last computed voltage exceeded the supply and was clamped.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// The last update ran without a position reading.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn updated_this_tick(&self) -> bool {
        self.last_update_tick == Some(self.tick)
    }

    pub fn constraints(&self) -> &ProfileConstraints {
        &self.constraints
    }
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// Keep tracking the current goal. Never finishes.
pub struct HoldPosition;

impl Task for HoldPosition {
    fn name(&self) -> &str {
        "arm-hold"
    }

    fn requirements(&self) -> Requirements {
        Requirements::ARM
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        robot.arm.update();
        TaskStatus::Running
    }
}

pub fn hold() -> HoldPosition {
    HoldPosition
}

enum GoalSource {
    Fixed(f64),
    Supplier(Box<dyn FnMut(&Robot) -> f64>),
}

/// Set the goal once at start, then track it until at goal.
pub struct SetGoal {
    source: GoalSource,
}

impl Task for SetGoal {
    fn name(&self) -> &str {
        "arm-set-goal"
    }

    fn requirements(&self) -> Requirements {
        Requirements::ARM
    }

    fn initialize(&mut self, robot: &mut Robot) {
        let goal = match &mut self.source {
            GoalSource::Fixed(angle) => *angle,
            GoalSource::Supplier(f) => f(robot),
        };
        robot.arm.set_goal(goal);
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        robot.arm.update();
        TaskStatus::from_done(robot.arm.at_goal())
    }
}

/// Move to `angle` [rad] and finish once at goal.
pub fn set_goal_until_at_goal(angle: f64) -> SetGoal {
    SetGoal {
        source: GoalSource::Fixed(angle),
    }
}

/// As [`set_goal_until_at_goal`], with the angle read when the task starts.
pub fn set_goal_from(supplier: impl FnMut(&Robot) -> f64 + 'static) -> SetGoal {
    SetGoal {
        source: GoalSource::Supplier(Box::new(supplier)),
    }
}

/// Re-read the goal every tick and track it. Never finishes.
pub struct ContinuousGoal {
    supplier: Box<dyn FnMut(&Robot) -> f64>,
}

impl Task for ContinuousGoal {
    fn name(&self) -> &str {
        "arm-continuous-goal"
    }

    fn requirements(&self) -> Requirements {
        Requirements::ARM
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        let goal = (self.supplier)(robot);
        robot.arm.set_goal(goal);
        robot.arm.update();
        TaskStatus::Running
    }
}

pub fn continuous_goal(supplier: impl FnMut(&Robot) -> f64 + 'static) -> ContinuousGoal {
    ContinuousGoal {
        supplier: Box::new(supplier),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
