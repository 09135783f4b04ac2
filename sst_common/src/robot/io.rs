//! Per-tick I/O frames.
//!
//! The control core never touches hardware. Each tick a driver hands it a
//! [`TickInput`] and writes the returned [`ActuatorFrame`] back out.

use serde::{Deserialize, Serialize};

use super::pose::ExtensionState;

/// Operating mode reported by the surrounding framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RobotMode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
    Test,
}

impl RobotMode {
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

/// Raw sensor readings for one tick. `None` marks an unreadable sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SensorFrame {
    /// Absolute arm angle [rad], continuous.
    pub arm_position: Option<f64>,
    /// Arm angular rate [rad/s].
    pub arm_velocity: Option<f64>,
    /// Chassis pitch [deg], positive nose-up.
    pub pitch_deg: Option<f64>,
    /// Intake roller current [A].
    pub intake_current: Option<f64>,
}

impl SensorFrame {
    /// A frame with every sensor reading valid.
    pub fn complete(arm_position: f64, arm_velocity: f64, pitch_deg: f64, intake_current: f64) -> Self {
        Self {
            arm_position: Some(arm_position),
            arm_velocity: Some(arm_velocity),
            pitch_deg: Some(pitch_deg),
            intake_current: Some(intake_current),
        }
    }
}

/// Everything the core receives at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TickInput {
    pub mode: RobotMode,
    pub alliance: Option<Alliance>,
    pub sensors: SensorFrame,
}

impl TickInput {
    pub fn new(mode: RobotMode, sensors: SensorFrame) -> Self {
        Self {
            mode,
            alliance: None,
            sensors,
        }
    }
}

/// Actuator commands produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ActuatorFrame {
    /// Arm motor voltage [V], within ±supply.
    pub arm_volts: f64,
    /// Extension solenoid position.
    pub extension: ExtensionState,
    /// Intake roller duty (−1..1); negative pulls in.
    pub intake_speed: f64,
    /// Intake jaw open.
    pub intake_open: bool,
    /// Left drive voltage [V].
    pub drive_left_volts: f64,
    /// Right drive voltage [V].
    pub drive_right_volts: f64,
}

impl ActuatorFrame {
    /// Every motor off; solenoids keep the given positions.
    pub fn idle(extension: ExtensionState, intake_open: bool) -> Self {
        Self {
            extension,
            intake_open,
            ..Self::default()
        }
    }
}
