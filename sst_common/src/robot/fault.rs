//! Sensor fault flags.
//!
//! A set flag means the sensor could not be read this tick. Faults are
//! recovered locally by the owning component and reported through telemetry;
//! none of them stops the control loop.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Unavailable-sensor flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Faults: u8 {
        /// Absolute arm encoder missing or invalid.
        const ARM_POSITION_SENSOR   = 0x01;
        /// Incremental arm encoder rate missing or invalid.
        const ARM_VELOCITY_SENSOR   = 0x02;
        /// Chassis IMU pitch missing or invalid.
        const PITCH_SENSOR          = 0x04;
        /// Intake roller current missing or invalid.
        const INTAKE_CURRENT_SENSOR = 0x08;
    }
}

impl Faults {
    /// Flags that degrade closed-loop arm control.
    pub const ARM_MASK: Self = Self::from_bits_truncate(
        Self::ARM_POSITION_SENSOR.bits() | Self::ARM_VELOCITY_SENSOR.bits(),
    );

    /// Human-readable names of the set flags.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Faults {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_mask_covers_both_arm_sensors() {
        assert!(Faults::ARM_MASK.contains(Faults::ARM_POSITION_SENSOR));
        assert!(Faults::ARM_MASK.contains(Faults::ARM_VELOCITY_SENSOR));
        assert!(!Faults::ARM_MASK.intersects(Faults::PITCH_SENSOR));
    }

    #[test]
    fn names_lists_set_flags() {
        let f = Faults::PITCH_SENSOR | Faults::ARM_POSITION_SENSOR;
        assert_eq!(f.names(), vec!["ARM_POSITION_SENSOR", "PITCH_SENSOR"]);
        assert!(Faults::default().names().is_empty());
    }
}
