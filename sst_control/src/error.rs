//! Control core error type.
//!
//! Only construction and driver I/O can fail. Nothing inside a tick returns
//! an error: unreadable sensors become [`Faults`], saturation is clamped and
//! cancellation is an [`Outcome`](crate::command::task::Outcome).

use sst_common::config::ConfigError;
use sst_common::robot::fault::Faults;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Configuration missing, malformed or out of bounds.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Required sensors could not be read.
    #[error("sensor unavailable: {0:?}")]
    SensorUnavailable(Faults),

    /// Robot driver failure.
    #[error("driver error: {0}")]
    Driver(String),
}
