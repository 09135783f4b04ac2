//! Prelude module for common re-exports.
//!
//! ```rust
//! use sst_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::robot::config::CoreConfig;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{SUPPLY_VOLTAGE, TICK_PERIOD_S};

// ─── Robot data ─────────────────────────────────────────────────────
pub use crate::robot::fault::Faults;
pub use crate::robot::io::{ActuatorFrame, Alliance, RobotMode, SensorFrame, TickInput};
pub use crate::robot::pose::{ExtensionState, GamePiece, Pose};
