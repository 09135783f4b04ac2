//! Control engine root.
//!
//! Trapezoidal profile, PID, arm feedforward and the small signal filters used
//! by the mechanisms. Zero gains disable the corresponding terms.

pub mod feedforward;
pub mod filters;
pub mod pid;
pub mod profile;
