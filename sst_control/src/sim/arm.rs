//! Single-jointed arm plant.
//!
//! Voltage-domain identified model:
//!
//! ```text
//! V = ks·tanh(ω/ω₀) + kg·cos θ + kv·ω + ka·α
//! ```
//!
//! integrated with 1 ms explicit-Euler substeps. Hard stops clamp the angle
//! and zero the rate.

use sst_common::consts::{ARM_MAX_ANGLE_DEG, ARM_MIN_ANGLE_DEG};

/// Substep for plant integration [s].
const SUBSTEP_S: f64 = 0.001;
/// Rate scale of the smoothed static friction [rad/s].
const FRICTION_RATE_SCALE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPlantParams {
    pub ks: f64,
    pub kg: f64,
    pub kv: f64,
    pub ka: f64,
    pub min_angle: f64,
    pub max_angle: f64,
}

impl Default for ArmPlantParams {
    /// Gravity slightly heavier than the controller's feedforward assumes.
    fn default() -> Self {
        Self {
            ks: 0.15,
            kg: 0.6,
            kv: 1.9,
            ka: 0.05,
            min_angle: ARM_MIN_ANGLE_DEG.to_radians(),
            max_angle: ARM_MAX_ANGLE_DEG.to_radians(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArmPlant {
    params: ArmPlantParams,
    angle: f64,
    rate: f64,
}

impl ArmPlant {
    pub fn new(params: ArmPlantParams, angle: f64) -> Self {
        Self {
            params,
            angle: angle.clamp(params.min_angle, params.max_angle),
            rate: 0.0,
        }
    }

    /// Angle [rad].
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Angular rate [rad/s].
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Apply `volts` for `dt` seconds.
    pub fn step(&mut self, volts: f64, dt: f64) {
        let p = self.params;
        let mut remaining = dt;
        while remaining > 1e-12 {
            let h = remaining.min(SUBSTEP_S);
            let accel = (volts
                - p.ks * (self.rate / FRICTION_RATE_SCALE).tanh()
                - p.kg * self.angle.cos()
                - p.kv * self.rate)
                / p.ka;
            self.rate += accel * h;
            self.angle += self.rate * h;
            if self.angle <= p.min_angle {
                self.angle = p.min_angle;
                self.rate = self.rate.max(0.0);
            } else if self.angle >= p.max_angle {
                self.angle = p.max_angle;
                self.rate = self.rate.min(0.0);
            }
            remaining -= h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpowered_arm_sags() {
        let mut plant = ArmPlant::new(ArmPlantParams::default(), 0.0);
        for _ in 0..200 {
            plant.step(0.0, 0.02);
        }
        assert!(plant.angle() < (-30.0f64).to_radians());
        assert!(plant.rate() < 0.0);
    }

    #[test]
    fn lower_stop_clamps() {
        let mut plant = ArmPlant::new(ArmPlantParams::default(), -1.5);
        for _ in 0..50 {
            plant.step(-12.0, 0.02);
        }
        assert_eq!(plant.angle(), ARM_MIN_ANGLE_DEG.to_radians());
        assert_eq!(plant.rate(), 0.0);
    }

    #[test]
    fn gravity_voltage_holds_horizontal() {
        let mut plant = ArmPlant::new(ArmPlantParams::default(), 0.0);
        for _ in 0..50 {
            plant.step(0.6, 0.02);
        }
        assert!(plant.angle().abs() < 1e-6);
    }

    #[test]
    fn full_voltage_hits_upper_stop() {
        let mut plant = ArmPlant::new(ArmPlantParams::default(), 0.0);
        for _ in 0..100 {
            plant.step(12.0, 0.02);
        }
        assert_eq!(plant.angle(), ARM_MAX_ANGLE_DEG.to_radians());
    }
}
