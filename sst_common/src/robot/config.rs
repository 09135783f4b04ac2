//! Control core configuration.
//!
//! `CoreConfig` is loaded once at startup and immutable afterwards. Every
//! section and every field carries a default, so an empty TOML document is a
//! valid configuration.
//!
//! Angles in this file are degrees unless the field name says otherwise; arm
//! velocity and acceleration limits are radians because the arm controller
//! works in radians.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig, require_non_negative, require_positive};
use crate::consts::{EXTENSION_SETTLE_S, MAX_FILTER_TAPS, SUPPLY_VOLTAGE, TICK_PERIOD_S};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete control core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub arm: ArmConfig,
    #[serde(default)]
    pub extension: ExtensionConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub superstructure: SuperstructureConfig,
    #[serde(default)]
    pub balance: BalanceConfig,
    #[serde(default)]
    pub shared: SharedConfig,
}

impl CoreConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// The first violated bound, as `ConfigError::ValidationError`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cycle.validate()?;
        self.arm.validate()?;
        self.extension.validate()?;
        self.intake.validate()?;
        self.superstructure.validate()?;
        self.balance.validate(self.cycle.supply_voltage)?;
        self.shared.validate()?;
        Ok(())
    }
}

// ─── Cycle ──────────────────────────────────────────────────────────

/// Tick timing and actuator supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Fixed tick period [s] (default: 0.02).
    #[serde(default = "default_tick_period")]
    pub tick_period_s: f64,

    /// Voltage bound for every voltage-driven actuator [V] (default: 12.0).
    #[serde(default = "default_supply_voltage")]
    pub supply_voltage: f64,

    /// Telemetry snapshot interval [ticks] (default: 5).
    #[serde(default = "default_telemetry_interval")]
    pub telemetry_interval: u32,
}

fn default_tick_period() -> f64 {
    TICK_PERIOD_S
}
fn default_supply_voltage() -> f64 {
    SUPPLY_VOLTAGE
}
fn default_telemetry_interval() -> u32 {
    5
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_s: default_tick_period(),
            supply_voltage: default_supply_voltage(),
            telemetry_interval: default_telemetry_interval(),
        }
    }
}

impl CycleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("cycle.tick_period_s", self.tick_period_s)?;
        require_positive("cycle.supply_voltage", self.supply_voltage)?;
        if self.telemetry_interval == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.telemetry_interval must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Arm ────────────────────────────────────────────────────────────

/// Arm feedback, feedforward and profile parameters.
///
/// # TOML Example
///
/// ```toml
/// [arm]
/// kp = 6.0
/// kd = 0.3
/// kg = 0.55
/// max_velocity = 3.0
/// max_acceleration = 6.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Proportional gain [V/rad].
    #[serde(default = "default_arm_kp")]
    pub kp: f64,
    /// Integral gain [V/(rad·s)].
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain [V·s/rad].
    #[serde(default = "default_arm_kd")]
    pub kd: f64,
    /// Derivative low-pass time constant [s]; 0 disables the filter.
    #[serde(default)]
    pub derivative_filter_s: f64,
    /// Anti-windup tracking time constant [s]; 0 disables back-calculation.
    #[serde(default)]
    pub anti_windup_s: f64,

    /// Static friction voltage [V].
    #[serde(default = "default_arm_ks")]
    pub ks: f64,
    /// Gravity voltage at horizontal [V].
    #[serde(default = "default_arm_kg")]
    pub kg: f64,
    /// Velocity constant [V·s/rad].
    #[serde(default = "default_arm_kv")]
    pub kv: f64,
    /// Acceleration constant [V·s²/rad].
    #[serde(default = "default_arm_ka")]
    pub ka: f64,

    /// Profile cruise velocity [rad/s].
    #[serde(default = "default_arm_max_velocity")]
    pub max_velocity: f64,
    /// Profile acceleration [rad/s²].
    #[serde(default = "default_arm_max_acceleration")]
    pub max_acceleration: f64,

    /// At-goal position tolerance [deg].
    #[serde(default = "default_arm_position_tolerance")]
    pub position_tolerance_deg: f64,
    /// At-goal velocity tolerance [deg/s].
    #[serde(default = "default_arm_velocity_tolerance")]
    pub velocity_tolerance_deg_s: f64,
}

fn default_arm_kp() -> f64 {
    6.0
}
fn default_arm_kd() -> f64 {
    0.3
}
fn default_arm_ks() -> f64 {
    0.15
}
fn default_arm_kg() -> f64 {
    0.55
}
fn default_arm_kv() -> f64 {
    1.9
}
fn default_arm_ka() -> f64 {
    0.05
}
fn default_arm_max_velocity() -> f64 {
    3.0
}
fn default_arm_max_acceleration() -> f64 {
    6.0
}
fn default_arm_position_tolerance() -> f64 {
    2.0
}
fn default_arm_velocity_tolerance() -> f64 {
    10.0
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            kp: default_arm_kp(),
            ki: 0.0,
            kd: default_arm_kd(),
            derivative_filter_s: 0.0,
            anti_windup_s: 0.0,
            ks: default_arm_ks(),
            kg: default_arm_kg(),
            kv: default_arm_kv(),
            ka: default_arm_ka(),
            max_velocity: default_arm_max_velocity(),
            max_acceleration: default_arm_max_acceleration(),
            position_tolerance_deg: default_arm_position_tolerance(),
            velocity_tolerance_deg_s: default_arm_velocity_tolerance(),
        }
    }
}

impl ArmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("arm.kp", self.kp),
            ("arm.ki", self.ki),
            ("arm.kd", self.kd),
            ("arm.derivative_filter_s", self.derivative_filter_s),
            ("arm.anti_windup_s", self.anti_windup_s),
            ("arm.ks", self.ks),
            ("arm.kg", self.kg),
            ("arm.kv", self.kv),
            ("arm.ka", self.ka),
        ] {
            require_non_negative(name, value)?;
        }
        require_positive("arm.max_velocity", self.max_velocity)?;
        require_positive("arm.max_acceleration", self.max_acceleration)?;
        require_positive("arm.position_tolerance_deg", self.position_tolerance_deg)?;
        require_positive("arm.velocity_tolerance_deg_s", self.velocity_tolerance_deg_s)?;
        Ok(())
    }
}

// ─── Extension ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Time the cylinders need after a solenoid change [s] (default: 0.5).
    #[serde(default = "default_settle_time")]
    pub settle_time_s: f64,
}

fn default_settle_time() -> f64 {
    EXTENSION_SETTLE_S
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            settle_time_s: default_settle_time(),
        }
    }
}

impl ExtensionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("extension.settle_time_s", self.settle_time_s)
    }
}

// ─── Intake ─────────────────────────────────────────────────────────

/// Roller speeds and cube stall detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Roller speed while pulling a cube in (default: −0.6).
    #[serde(default = "default_intake_cube_speed")]
    pub intake_cube_speed: f64,
    /// Roller speed that keeps a held cube seated (default: −0.1).
    #[serde(default = "default_hold_cube_speed")]
    pub hold_cube_speed: f64,
    /// Duration of a cube ejection [s] (default: 0.5).
    #[serde(default = "default_eject_duration")]
    pub eject_duration_s: f64,
    /// Filtered roller current above which the cube counts as seated [A].
    #[serde(default = "default_stall_current")]
    pub stall_current_a: f64,
    /// How long the stall current must persist [s] (default: 1.0).
    #[serde(default = "default_stall_debounce")]
    pub stall_debounce_s: f64,
    /// Moving-average window on the roller current [samples] (default: 10).
    #[serde(default = "default_current_filter_taps")]
    pub current_filter_taps: usize,
}

fn default_intake_cube_speed() -> f64 {
    -0.6
}
fn default_hold_cube_speed() -> f64 {
    -0.1
}
fn default_eject_duration() -> f64 {
    0.5
}
fn default_stall_current() -> f64 {
    20.0
}
fn default_stall_debounce() -> f64 {
    1.0
}
fn default_current_filter_taps() -> usize {
    10
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            intake_cube_speed: default_intake_cube_speed(),
            hold_cube_speed: default_hold_cube_speed(),
            eject_duration_s: default_eject_duration(),
            stall_current_a: default_stall_current(),
            stall_debounce_s: default_stall_debounce(),
            current_filter_taps: default_current_filter_taps(),
        }
    }
}

impl IntakeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("intake.intake_cube_speed", self.intake_cube_speed),
            ("intake.hold_cube_speed", self.hold_cube_speed),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be within [-1, 1] (got {value})"
                )));
            }
        }
        require_positive("intake.eject_duration_s", self.eject_duration_s)?;
        require_positive("intake.stall_current_a", self.stall_current_a)?;
        require_non_negative("intake.stall_debounce_s", self.stall_debounce_s)?;
        if self.current_filter_taps == 0 || self.current_filter_taps > MAX_FILTER_TAPS {
            return Err(ConfigError::ValidationError(format!(
                "intake.current_filter_taps {} out of range [1, {}]",
                self.current_filter_taps, MAX_FILTER_TAPS
            )));
        }
        Ok(())
    }
}

// ─── Superstructure ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperstructureConfig {
    /// Goal distance below which a pose change skips retraction [deg].
    #[serde(default = "default_retract_skip_tolerance")]
    pub retract_skip_tolerance_deg: f64,
    /// Offset applied by bump-up [deg].
    #[serde(default = "default_bump_up")]
    pub bump_up_deg: f64,
    /// Offset applied by bump-down [deg].
    #[serde(default = "default_bump_down")]
    pub bump_down_deg: f64,
}

fn default_retract_skip_tolerance() -> f64 {
    8.0
}
fn default_bump_up() -> f64 {
    3.0
}
fn default_bump_down() -> f64 {
    -3.0
}

impl Default for SuperstructureConfig {
    fn default() -> Self {
        Self {
            retract_skip_tolerance_deg: default_retract_skip_tolerance(),
            bump_up_deg: default_bump_up(),
            bump_down_deg: default_bump_down(),
        }
    }
}

impl SuperstructureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative(
            "superstructure.retract_skip_tolerance_deg",
            self.retract_skip_tolerance_deg,
        )?;
        if !self.bump_up_deg.is_finite() || !self.bump_down_deg.is_finite() {
            return Err(ConfigError::ValidationError(
                "superstructure bump offsets must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Balance ────────────────────────────────────────────────────────

/// Self-leveling parameters.
///
/// Direction tables hold magnitudes; the balance direction supplies the sign.
/// A direction table given in TOML must name its own `pitch_trip_deg` and
/// `pitch_debounce_s`, the remaining fields default to the shared values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Hold-phase deadband half-width [deg] (default: 5.0).
    #[serde(default = "default_balanced_threshold")]
    pub balanced_threshold_deg: f64,
    /// Hold-phase drive magnitude [V] (default: 0.5).
    #[serde(default = "default_bang_bang_volts")]
    pub bang_bang_volts: f64,
    #[serde(default = "BalanceDirectionConfig::forward")]
    pub forward: BalanceDirectionConfig,
    #[serde(default = "BalanceDirectionConfig::backward")]
    pub backward: BalanceDirectionConfig,
}

fn default_balanced_threshold() -> f64 {
    5.0
}
fn default_bang_bang_volts() -> f64 {
    0.5
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            balanced_threshold_deg: default_balanced_threshold(),
            bang_bang_volts: default_bang_bang_volts(),
            forward: BalanceDirectionConfig::forward(),
            backward: BalanceDirectionConfig::backward(),
        }
    }
}

impl BalanceConfig {
    pub fn validate(&self, supply_voltage: f64) -> Result<(), ConfigError> {
        require_non_negative("balance.balanced_threshold_deg", self.balanced_threshold_deg)?;
        require_non_negative("balance.bang_bang_volts", self.bang_bang_volts)?;
        if self.bang_bang_volts > supply_voltage {
            return Err(ConfigError::ValidationError(format!(
                "balance.bang_bang_volts {} exceeds supply voltage {}",
                self.bang_bang_volts, supply_voltage
            )));
        }
        self.forward.validate("balance.forward", supply_voltage)?;
        self.backward.validate("balance.backward", supply_voltage)?;
        Ok(())
    }
}

/// Approach and decelerate constants for one direction (magnitudes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDirectionConfig {
    /// Approach drive [V].
    #[serde(default = "default_approach_volts")]
    pub approach_volts: f64,
    /// Pitch that ends the approach [deg].
    pub pitch_trip_deg: f64,
    /// How long the pitch trip must hold [s].
    pub pitch_debounce_s: f64,
    /// First decelerate drive [V].
    #[serde(default = "default_decelerate_volts")]
    pub decelerate_volts: f64,
    /// Duration of the first decelerate drive [s].
    #[serde(default = "default_decelerate_time")]
    pub decelerate_time_s: f64,
    /// Creep drive after the first decelerate segment [V].
    #[serde(default = "default_creep_volts")]
    pub creep_volts: f64,
    /// Pitch rate that ends the creep [deg/s].
    #[serde(default = "default_rate_trip")]
    pub rate_trip_deg_s: f64,
    /// How long the rate trip must hold [s].
    #[serde(default = "default_rate_debounce")]
    pub rate_debounce_s: f64,
}

fn default_approach_volts() -> f64 {
    3.0
}
fn default_decelerate_volts() -> f64 {
    1.0
}
fn default_decelerate_time() -> f64 {
    1.0
}
fn default_creep_volts() -> f64 {
    0.75
}
fn default_rate_trip() -> f64 {
    15.0
}
fn default_rate_debounce() -> f64 {
    0.05
}

impl BalanceDirectionConfig {
    fn with_trip(pitch_trip_deg: f64, pitch_debounce_s: f64) -> Self {
        Self {
            approach_volts: default_approach_volts(),
            pitch_trip_deg,
            pitch_debounce_s,
            decelerate_volts: default_decelerate_volts(),
            decelerate_time_s: default_decelerate_time(),
            creep_volts: default_creep_volts(),
            rate_trip_deg_s: default_rate_trip(),
            rate_debounce_s: default_rate_debounce(),
        }
    }

    /// Driving onto the station front-first.
    pub fn forward() -> Self {
        Self::with_trip(14.0, 0.75)
    }

    /// Driving onto the station rear-first.
    pub fn backward() -> Self {
        Self::with_trip(10.0, 0.25)
    }

    pub fn validate(&self, section: &str, supply_voltage: f64) -> Result<(), ConfigError> {
        for (name, value) in [
            ("approach_volts", self.approach_volts),
            ("decelerate_volts", self.decelerate_volts),
            ("creep_volts", self.creep_volts),
        ] {
            require_non_negative(&format!("{section}.{name}"), value)?;
            if value > supply_voltage {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.{name} {value} exceeds supply voltage {supply_voltage}"
                )));
            }
        }
        require_positive(&format!("{section}.pitch_trip_deg"), self.pitch_trip_deg)?;
        require_positive(&format!("{section}.rate_trip_deg_s"), self.rate_trip_deg_s)?;
        require_non_negative(&format!("{section}.pitch_debounce_s"), self.pitch_debounce_s)?;
        require_non_negative(&format!("{section}.decelerate_time_s"), self.decelerate_time_s)?;
        require_non_negative(&format!("{section}.rate_debounce_s"), self.rate_debounce_s)?;
        Ok(())
    }
}
