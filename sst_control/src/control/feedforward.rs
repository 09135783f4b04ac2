//! Arm feedforward.
//!
//! ```text
//! ff = Ks × sign(v) + Kg × cos(θ) + Kv × v + Ka × a
//! ```
//!
//! θ is measured from horizontal, so the gravity term peaks with the arm
//! level and vanishes with the arm vertical. Zero gains disable each term.

use sst_common::robot::config::ArmConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmFeedforwardGains {
    /// Static friction [V].
    pub ks: f64,
    /// Gravity at horizontal [V].
    pub kg: f64,
    /// Velocity [V·s/rad].
    pub kv: f64,
    /// Acceleration [V·s²/rad].
    pub ka: f64,
}

impl ArmFeedforwardGains {
    pub fn from_arm(config: &ArmConfig) -> Self {
        Self {
            ks: config.ks,
            kg: config.kg,
            kv: config.kv,
            ka: config.ka,
        }
    }
}

/// Feedforward voltage for a setpoint.
///
/// # Arguments
/// - `position`: setpoint angle [rad].
/// - `velocity`: setpoint angular velocity [rad/s].
/// - `acceleration`: setpoint angular acceleration [rad/s²].
#[inline]
pub fn arm_feedforward(
    gains: &ArmFeedforwardGains,
    position: f64,
    velocity: f64,
    acceleration: f64,
) -> f64 {
    let mut output = gains.kg * position.cos();

    if gains.ks != 0.0 && velocity != 0.0 {
        output += gains.ks * velocity.signum();
    }
    if gains.kv != 0.0 {
        output += gains.kv * velocity;
    }
    if gains.ka != 0.0 {
        output += gains.ka * acceleration;
    }

    output
}

// ─── Tests ──────────────────────────────────────────────────────────
