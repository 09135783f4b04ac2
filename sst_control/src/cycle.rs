//! Control cycle: ingest → process → emit.
//!
//! ## Tick Body
//! 1. Ingest the sensor frame (time advances by one tick period).
//! 2. Health monitor update from the unreadable sensors.
//! 3. Mode handling: on disable cancel every task and send the arm goal to
//!    stow; while disabled re-seed the arm profile from the measured angle.
//! 4. Enabled only: run the scheduled tasks.
//! 5. Default behaviors for subsystems no task serviced: arm holds its goal,
//!    drivetrain outputs zero.
//! 6. Assemble the [`ActuatorFrame`] and record cycle statistics.
//!
//! Nothing in the body blocks and no reading can abort it.

use std::time::Instant;

use serde::Serialize;
use sst_common::config::ConfigError;
use sst_common::robot::config::CoreConfig;
use sst_common::robot::fault::Faults;
use sst_common::robot::io::{ActuatorFrame, RobotMode, TickInput};
use sst_common::robot::pose::{ExtensionState, GamePiece, Pose};
use tracing::{info, trace};

use crate::balance::BalancePhase;
use crate::command::runner::TaskRunner;
use crate::command::task::BoxedTask;
use crate::health::{StatusColor, observe_faults};
use crate::robot::Robot;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick processing-time statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick processing time [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick processing time [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick processing time [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Ticks whose processing exceeded the tick period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record one tick's processing time. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, period_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        if duration_ns > period_ns {
            self.overruns += 1;
        }
    }

    /// Average processing time [ns] (0 before the first tick).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Telemetry ──────────────────────────────────────────────────────

/// Snapshot published after every tick. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub tick: u64,
    pub time_s: f64,
    pub mode: RobotMode,
    pub arm_position_deg: Option<f64>,
    pub arm_goal_deg: f64,
    pub arm_setpoint_deg: f64,
    pub arm_setpoint_velocity_deg_s: f64,
    pub arm_volts: f64,
    pub arm_saturated: bool,
    pub arm_degraded: bool,
    pub arm_at_goal: bool,
    pub extension: ExtensionState,
    pub intake_speed: f64,
    pub intake_open: bool,
    pub intake_current_a: f64,
    pub game_piece: GamePiece,
    pub last_pose: Pose,
    pub balance_phase: Option<BalancePhase>,
    pub pitch_deg: Option<f64>,
    pub pitch_rate_deg_s: f64,
    pub drive_left_volts: f64,
    pub drive_right_volts: f64,
    pub faults: Faults,
    pub latched_faults: Faults,
    pub status_color: StatusColor,
    pub active_tasks: Vec<String>,
}

// ─── Control Core ───────────────────────────────────────────────────

pub struct ControlCore {
    robot: Robot,
    runner: TaskRunner,
    stats: CycleStats,
    period_ns: i64,
    was_enabled: bool,
}

impl ControlCore {
    /// # Errors
    /// Any configuration validation failure.
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        let period_ns = (config.cycle.tick_period_s * 1e9) as i64;
        let robot = Robot::new(config)?;
        info!(
            "control core ready: tick {:.0} ms",
            robot.dt() * 1e3
        );
        Ok(Self {
            robot,
            runner: TaskRunner::new(),
            stats: CycleStats::new(),
            period_ns,
            was_enabled: false,
        })
    }

    /// Start `task`, canceling whatever holds a conflicting requirement.
    pub fn schedule(&mut self, task: BoxedTask) {
        self.runner.schedule(&mut self.robot, task);
    }

    pub fn cancel_all(&mut self) {
        self.runner.cancel_all(&mut self.robot);
    }

    /// Run one control tick.
    pub fn tick(&mut self, input: &TickInput) -> ActuatorFrame {
        let started = Instant::now();
        let robot = &mut self.robot;

        robot.ingest(input);
        robot.health.update(observe_faults(&input.sensors));

        let enabled = input.mode.is_enabled();
        if self.was_enabled && !enabled {
            info!("disabled: canceling {} task(s)", self.runner.len());
            self.runner.cancel_all(robot);
            robot.arm.set_goal(Pose::Stow.arm_angle());
        } else if !self.was_enabled && enabled {
            info!("enabled ({:?})", input.mode);
        }
        self.was_enabled = enabled;

        if enabled {
            self.runner.run(robot);
            if !robot.arm.updated_this_tick() {
                robot.arm.update();
            }
        } else {
            robot.arm.reset_to_measurement();
            robot.intake.stop();
        }
        robot.drivetrain.finish_tick();

        let game_piece = robot.superstructure.game_piece();
        robot
            .status
            .update(input.mode, input.alliance, game_piece);

        let frame = robot.actuator_frame();
        let elapsed = started.elapsed().as_nanos() as i64;
        self.stats.record(elapsed, self.period_ns);
        trace!(
            "tick {} arm {:.2} V drive {:.2}/{:.2} V",
            robot.tick(),
            frame.arm_volts,
            frame.drive_left_volts,
            frame.drive_right_volts
        );
        frame
    }

    /// Snapshot of the state after the last tick.
    pub fn telemetry(&self) -> Telemetry {
        let r = &self.robot;
        let setpoint = r.arm.setpoint();
        let (left, right) = r.drivetrain.voltages();
        Telemetry {
            tick: r.tick(),
            time_s: r.time(),
            mode: r.mode(),
            arm_position_deg: r.arm.position().map(f64::to_degrees),
            arm_goal_deg: r.arm.goal().to_degrees(),
            arm_setpoint_deg: setpoint.position.to_degrees(),
            arm_setpoint_velocity_deg_s: setpoint.velocity.to_degrees(),
            arm_volts: r.arm.voltage(),
            arm_saturated: r.arm.is_saturated(),
            arm_degraded: r.arm.is_degraded(),
            arm_at_goal: r.arm.at_goal(),
            extension: r.extension.state(),
            intake_speed: r.intake.speed(),
            intake_open: r.intake.is_open(),
            intake_current_a: r.intake.filtered_current(),
            game_piece: r.superstructure.game_piece(),
            last_pose: r.superstructure.last_pose(),
            balance_phase: r.balance_phase,
            pitch_deg: r.drivetrain.pitch(),
            pitch_rate_deg_s: r.drivetrain.pitch_rate(),
            drive_left_volts: left,
            drive_right_volts: right,
            faults: r.health.active(),
            latched_faults: r.health.latched(),
            status_color: r.status.color(),
            active_tasks: self.runner.active_names().into_iter().map(String::from).collect(),
        }
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Names of the running tasks.
    pub fn active_tasks(&self) -> Vec<&str> {
        self.runner.active_names()
    }

    pub fn is_idle(&self) -> bool {
        self.runner.is_idle()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
