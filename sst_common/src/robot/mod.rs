//! Robot-level shared types.
//!
//! Everything the control core exchanges with its surroundings lives here:
//! the configuration structure, the pose catalogue, the per-tick I/O frames
//! and the sensor fault flags.

pub mod config;
pub mod fault;
pub mod io;
pub mod pose;
