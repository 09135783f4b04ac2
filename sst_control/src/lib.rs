//! # SST Control Library
//!
//! Superstructure control core for a mobile manipulator: a single-joint arm
//! under motion-profiled feedback + feedforward control, a two-state
//! telescoping extension, a roller intake and a tank drivetrain with a
//! self-leveling routine.
//!
//! ## Tick Model
//!
//! The core never blocks and never reads a clock. An external scheduler calls
//! [`cycle::ControlCore::tick`] once per fixed period with a
//! [`TickInput`](sst_common::robot::io::TickInput) and writes the returned
//! [`ActuatorFrame`](sst_common::robot::io::ActuatorFrame) to hardware.
//! Everything that "waits" (extension settle, arm at-goal, debounce windows)
//! is a task re-evaluated once per tick.
//!
//! ## Layers
//!
//! 1. **control**: profile generator, PID, feedforward, filters
//! 2. **mechanism**: arm, extension, intake, drivetrain
//! 3. **command**: task trait, combinators, runner with requirement exclusivity
//! 4. **superstructure / balance / routines**: composed behaviors
//! 5. **cycle**: the per-tick read → process → write pipeline

pub mod balance;
pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod health;
pub mod mechanism;
pub mod robot;
pub mod routines;
pub mod sim;
pub mod superstructure;
