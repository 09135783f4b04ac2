//! Robot drivers.
//!
//! A [`RobotDriver`] stands between the control core and the hardware: it
//! produces one [`TickInput`] per tick and applies the resulting
//! [`ActuatorFrame`]. [`SimulatedRobot`] is the in-process plant used by the
//! binary and the integration tests.
//!
//! # Lifecycle
//!
//! 1. `read()` at the start of every tick
//! 2. `write()` with the frame the core produced for that tick
//!
//! Neither call may block for longer than one tick period.

pub mod arm;
pub mod charge_station;

use sst_common::robot::fault::Faults;
use sst_common::robot::io::{ActuatorFrame, Alliance, RobotMode, SensorFrame, TickInput};
use sst_common::robot::pose::{ExtensionState, Pose};
use tracing::{debug, info};

use crate::error::CoreError;
use arm::{ArmPlant, ArmPlantParams};
use charge_station::{Approach, ChargeStation, ChargeStationParams};

/// Interface between the control core and a robot backend.
pub trait RobotDriver {
    /// Backend identifier (e.g. "simulation").
    fn name(&self) -> &'static str;

    /// Sample every sensor and the framework state for the coming tick.
    ///
    /// # Errors
    /// `CoreError::Driver` if the backend cannot be reached at all. A single
    /// unreadable sensor is reported as `None` in the frame instead.
    fn read(&mut self) -> Result<TickInput, CoreError>;

    /// Apply the actuator commands and advance the backend by `dt` seconds.
    fn write(&mut self, frame: &ActuatorFrame, dt: f64) -> Result<(), CoreError>;
}

// ─── Intake Model ───────────────────────────────────────────────────

/// Free-spinning roller current per unit duty [A].
const ROLLER_FREE_CURRENT_A: f64 = 8.0;
/// Roller current with a cube jammed against the back plate [A].
const ROLLER_STALL_CURRENT_A: f64 = 35.0;
/// Time the rollers must pull with the jaw open before a cube seats [s].
const CUBE_SEAT_TIME_S: f64 = 0.6;

#[derive(Debug, Clone, Default)]
struct IntakeModel {
    pulling_s: f64,
    has_cube: bool,
    speed: f64,
}

impl IntakeModel {
    fn current(&self) -> f64 {
        if self.has_cube && self.speed < 0.0 {
            ROLLER_STALL_CURRENT_A
        } else {
            self.speed.abs() * ROLLER_FREE_CURRENT_A
        }
    }

    fn step(&mut self, speed: f64, open: bool, dt: f64) {
        self.speed = speed;
        if speed > 0.0 {
            if self.has_cube {
                debug!("sim: cube ejected");
            }
            self.has_cube = false;
            self.pulling_s = 0.0;
        } else if speed < 0.0 && open && !self.has_cube {
            self.pulling_s += dt;
            if self.pulling_s + 1e-9 >= CUBE_SEAT_TIME_S {
                debug!("sim: cube seated");
                self.has_cube = true;
            }
        } else if !self.has_cube {
            self.pulling_s = 0.0;
        }
    }
}

// ─── Simulated Robot ────────────────────────────────────────────────

/// Deterministic plant: arm, charge station under the drivetrain, extension
/// cylinder and roller intake.
pub struct SimulatedRobot {
    arm: ArmPlant,
    station: ChargeStation,
    intake: IntakeModel,
    extension: ExtensionState,
    mode: RobotMode,
    alliance: Option<Alliance>,
    faults: Faults,
    time_s: f64,
}

impl SimulatedRobot {
    /// Arm resting at stow, base lined up on the `approach` side of the
    /// charge station, robot disabled.
    pub fn new(approach: Approach) -> Self {
        Self::with_params(
            ArmPlantParams::default(),
            ChargeStationParams::default(),
            approach,
        )
    }

    pub fn with_params(arm: ArmPlantParams, station: ChargeStationParams, approach: Approach) -> Self {
        info!("sim: arm at stow, approaching station {:?}", approach);
        Self {
            arm: ArmPlant::new(arm, Pose::Stow.arm_angle()),
            station: ChargeStation::new(station, approach),
            intake: IntakeModel::default(),
            extension: ExtensionState::Retracted,
            mode: RobotMode::Disabled,
            alliance: None,
            faults: Faults::empty(),
            time_s: 0.0,
        }
    }

    pub fn set_mode(&mut self, mode: RobotMode) {
        self.mode = mode;
    }

    pub fn set_alliance(&mut self, alliance: Option<Alliance>) {
        self.alliance = alliance;
    }

    /// Make the flagged sensors unreadable until cleared.
    pub fn inject_faults(&mut self, faults: Faults) {
        self.faults |= faults;
    }

    pub fn clear_faults(&mut self, faults: Faults) {
        self.faults -= faults;
    }

    /// Start with a cube already in the intake.
    pub fn preload_cube(&mut self) {
        self.intake.has_cube = true;
    }

    pub fn has_cube(&self) -> bool {
        self.intake.has_cube
    }

    pub fn arm(&self) -> &ArmPlant {
        &self.arm
    }

    pub fn station(&self) -> &ChargeStation {
        &self.station
    }

    pub fn extension(&self) -> ExtensionState {
        self.extension
    }

    /// Simulated time [s].
    pub fn time(&self) -> f64 {
        self.time_s
    }

    fn masked(&self, flag: Faults, value: f64) -> Option<f64> {
        if self.faults.contains(flag) {
            None
        } else {
            Some(value)
        }
    }
}

impl RobotDriver for SimulatedRobot {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn read(&mut self) -> Result<TickInput, CoreError> {
        let sensors = SensorFrame {
            arm_position: self.masked(Faults::ARM_POSITION_SENSOR, self.arm.angle()),
            arm_velocity: self.masked(Faults::ARM_VELOCITY_SENSOR, self.arm.rate()),
            pitch_deg: self.masked(Faults::PITCH_SENSOR, self.station.pitch()),
            intake_current: self.masked(Faults::INTAKE_CURRENT_SENSOR, self.intake.current()),
        };
        Ok(TickInput {
            mode: self.mode,
            alliance: self.alliance,
            sensors,
        })
    }

    fn write(&mut self, frame: &ActuatorFrame, dt: f64) -> Result<(), CoreError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(CoreError::Driver(format!("invalid step {dt}")));
        }
        self.arm.step(frame.arm_volts, dt);
        let drive = 0.5 * (frame.drive_left_volts + frame.drive_right_volts);
        self.station.step(drive, dt);
        self.intake.step(frame.intake_speed, frame.intake_open, dt);
        if frame.extension != self.extension {
            debug!("sim: extension -> {:?}", frame.extension);
            self.extension = frame.extension;
        }
        self.time_s += dt;
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
