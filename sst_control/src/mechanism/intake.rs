//! Roller intake with pneumatic jaw.
//!
//! Cubes are pulled in by the rollers until the filtered roller current
//! shows a seated cube; cones are clamped by closing the jaw.

use sst_common::config::ConfigError;
use sst_common::robot::config::IntakeConfig;
use tracing::debug;

use crate::command::group::{FnTask, instant, start_end};
use crate::command::task::{Outcome, Requirements, Task, TaskStatus};
use crate::control::filters::{Debouncer, MovingAverage};
use crate::robot::Robot;

#[derive(Debug, Clone)]
pub struct Intake {
    config: IntakeConfig,
    speed: f64,
    open: bool,
    current_filter: MovingAverage,
    filtered_current: f64,
}

impl Intake {
    /// Starts closed with rollers stopped.
    pub fn new(config: &IntakeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            speed: 0.0,
            open: false,
            current_filter: MovingAverage::new(config.current_filter_taps),
            filtered_current: 0.0,
        })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Feed this tick's roller current. A missing reading leaves the
    /// filtered value where it was.
    pub fn ingest_current(&mut self, current: Option<f64>) {
        if let Some(amps) = current {
            self.filtered_current = self.current_filter.calculate(amps);
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Roller duty, clamped to −1..1. Negative pulls in.
    pub fn set_rollers(&mut self, speed: f64) {
        self.speed = speed.clamp(-1.0, 1.0);
    }

    pub fn stop(&mut self) {
        self.speed = 0.0;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn filtered_current(&self) -> f64 {
        self.filtered_current
    }
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// Open the jaw and run the rollers until a cube stalls them, then drop to
/// holding speed (also when canceled).
pub struct IntakeCube {
    stall: Debouncer,
}

impl Task for IntakeCube {
    fn name(&self) -> &str {
        "intake-cube"
    }

    fn requirements(&self) -> Requirements {
        Requirements::INTAKE
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.stall = Debouncer::new(robot.intake.config().stall_debounce_s);
        robot.intake.open();
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        let intake = &mut robot.intake;
        intake.set_rollers(intake.config.intake_cube_speed);
        let stalled = intake.filtered_current > intake.config.stall_current_a;
        TaskStatus::from_done(self.stall.calculate(stalled, robot.dt()))
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        debug!("intake-cube ended: {:?}", outcome);
        let hold = robot.intake.config().hold_cube_speed;
        robot.intake.set_rollers(hold);
    }
}

pub fn intake_cube() -> IntakeCube {
    IntakeCube {
        stall: Debouncer::new(0.0),
    }
}

/// Run the rollers at a speed read every tick; stop them on end.
pub struct Eject {
    speed: Box<dyn FnMut(&Robot) -> f64>,
}

impl Task for Eject {
    fn name(&self) -> &str {
        "eject"
    }

    fn requirements(&self) -> Requirements {
        Requirements::INTAKE
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        let speed = (self.speed)(robot);
        robot.intake.set_rollers(speed);
        TaskStatus::Running
    }

    fn end(&mut self, robot: &mut Robot, _outcome: Outcome) {
        robot.intake.stop();
    }
}

pub fn eject(speed: impl FnMut(&Robot) -> f64 + 'static) -> Eject {
    Eject {
        speed: Box::new(speed),
    }
}

/// Stop the rollers and clamp the jaw until canceled.
pub fn hold_closed() -> FnTask {
    start_end(
        "intake-hold-closed",
        Requirements::INTAKE,
        |r| {
            r.intake.stop();
            r.intake.close();
        },
        |r| r.intake.stop(),
    )
}

pub fn open() -> FnTask {
    instant("intake-open", Requirements::INTAKE, |r| r.intake.open())
}

// ─── Tests ──────────────────────────────────────────────────────────
