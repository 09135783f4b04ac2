//! System-wide constants for the SST workspace.
//!
//! Single source of truth for defaults shared by the configuration layer,
//! the control core and the simulation.

/// Default control tick period [s] (50 Hz).
pub const TICK_PERIOD_S: f64 = 0.02;

/// Nominal battery voltage; arm and drive commands are clamped to ±this [V].
pub const SUPPLY_VOLTAGE: f64 = 12.0;

/// Settle time of the extension cylinders after a solenoid change [s].
pub const EXTENSION_SETTLE_S: f64 = 0.5;

/// Mechanical lower limit of the arm [deg].
pub const ARM_MIN_ANGLE_DEG: f64 = -90.0;

/// Mechanical upper limit of the arm [deg].
pub const ARM_MAX_ANGLE_DEG: f64 = 75.0;

/// Capacity of the fixed-size roller current filter.
pub const MAX_FILTER_TAPS: usize = 32;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/sst.toml";
