//! Mechanism layer.
//!
//! One module per physical mechanism: state, per-tick sensor ingestion,
//! output computation and the primitive tasks that drive it.

pub mod arm;
pub mod drivetrain;
pub mod extension;
pub mod intake;
