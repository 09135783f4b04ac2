//! Robot context.
//!
//! Owns every mechanism plus the superstructure bookkeeping, health monitor
//! and status display. Tasks receive it as `&mut Robot` each tick; nothing
//! in the core is global.

use sst_common::config::ConfigError;
use sst_common::robot::config::CoreConfig;
use sst_common::robot::io::{ActuatorFrame, Alliance, RobotMode, TickInput};

use crate::balance::BalancePhase;
use crate::health::{HealthMonitor, StatusDisplay, sanitize};
use crate::mechanism::arm::ArmController;
use crate::mechanism::drivetrain::Drivetrain;
use crate::mechanism::extension::ExtensionGate;
use crate::mechanism::intake::Intake;
use crate::superstructure::SuperstructureState;

pub struct Robot {
    pub arm: ArmController,
    pub extension: ExtensionGate,
    pub intake: Intake,
    pub drivetrain: Drivetrain,
    pub superstructure: SuperstructureState,
    pub health: HealthMonitor,
    pub status: StatusDisplay,
    /// Phase of the running balance task, if any.
    pub balance_phase: Option<BalancePhase>,

    config: CoreConfig,
    mode: RobotMode,
    alliance: Option<Alliance>,
    tick: u64,
    time_s: f64,
}

impl Robot {
    /// Validate `config` and build every mechanism from it.
    ///
    /// # Errors
    /// The first validation failure of any section.
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arm: ArmController::new(&config.arm, &config.cycle)?,
            extension: ExtensionGate::new(&config.extension)?,
            intake: Intake::new(&config.intake)?,
            drivetrain: Drivetrain::new(&config.cycle)?,
            superstructure: SuperstructureState::default(),
            health: HealthMonitor::new(),
            status: StatusDisplay::new(),
            balance_phase: None,
            config,
            mode: RobotMode::Disabled,
            alliance: None,
            tick: 0,
            time_s: 0.0,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Tick period [s].
    #[inline]
    pub fn dt(&self) -> f64 {
        self.config.cycle.tick_period_s
    }

    /// Accumulated tick time since construction [s].
    pub fn time(&self) -> f64 {
        self.time_s
    }

    /// Number of ticks ingested so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    pub fn alliance(&self) -> Option<Alliance> {
        self.alliance
    }

    /// Start a new tick: advance time and hand the readings to their owners.
    /// Non-finite readings are treated as missing.
    pub(crate) fn ingest(&mut self, input: &TickInput) {
        self.tick += 1;
        self.time_s += self.dt();
        self.mode = input.mode;
        self.alliance = input.alliance;

        let sensors = sanitize(&input.sensors);
        self.arm
            .ingest(self.tick, sensors.arm_position, sensors.arm_velocity);
        self.drivetrain.ingest_pitch(sensors.pitch_deg);
        self.intake.ingest_current(sensors.intake_current);
        self.drivetrain.begin_tick();
    }

    /// Current outputs of every mechanism.
    pub fn actuator_frame(&self) -> ActuatorFrame {
        let (left, right) = self.drivetrain.voltages();
        ActuatorFrame {
            arm_volts: self.arm.voltage(),
            extension: self.extension.state(),
            intake_speed: self.intake.speed(),
            intake_open: self.intake.is_open(),
            drive_left_volts: left,
            drive_right_volts: right,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
