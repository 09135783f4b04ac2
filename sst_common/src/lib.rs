//! SST Common Library
//!
//! Shared data definitions for the SST superstructure control workspace.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait and error type
//! - [`consts`] - Workspace-wide numeric defaults
//! - [`robot`] - Pose catalogue, I/O frames, fault flags and the core configuration
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod prelude;
pub mod robot;
