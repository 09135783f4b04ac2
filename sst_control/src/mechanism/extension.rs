//! Extension gate.
//!
//! Two-state telescoping extension driven by a solenoid. A state change only
//! counts as done once the cylinders have had the settle time to travel; the
//! superstructure relies on that before swinging the arm through the
//! extension's envelope.

use sst_common::config::ConfigError;
use sst_common::robot::config::ExtensionConfig;
use sst_common::robot::pose::ExtensionState;
use tracing::debug;

use crate::command::task::{Requirements, Task, TaskStatus};
use crate::robot::Robot;

const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ExtensionGate {
    state: ExtensionState,
    settle_time_s: f64,
}

impl ExtensionGate {
    /// Starts retracted.
    pub fn new(config: &ExtensionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: ExtensionState::Retracted,
            settle_time_s: config.settle_time_s,
        })
    }

    /// Last commanded solenoid state.
    pub fn state(&self) -> ExtensionState {
        self.state
    }

    pub fn settle_time(&self) -> f64 {
        self.settle_time_s
    }

    /// Command the solenoid; returns whether the state changed.
    pub fn actuate(&mut self, target: ExtensionState) -> bool {
        if self.state == target {
            return false;
        }
        debug!("extension {:?} -> {:?}", self.state, target);
        self.state = target;
        true
    }
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// Drive the extension to `target` and wait out the settle time.
///
/// Zero-duration when already in `target`: finishes on its first execute.
/// Otherwise the settle time is counted from the end of the tick the
/// solenoid switched in, so the task finishes no earlier than
/// `settle_time / dt` ticks after that one.
pub struct SetExtension {
    target: ExtensionState,
    settling: bool,
    elapsed_s: f64,
}

impl Task for SetExtension {
    fn name(&self) -> &str {
        match self.target {
            ExtensionState::Extended => "extend",
            ExtensionState::Retracted => "retract",
        }
    }

    fn requirements(&self) -> Requirements {
        Requirements::EXTENSION
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.elapsed_s = 0.0;
        self.settling = robot.extension.actuate(self.target);
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        if !self.settling {
            return TaskStatus::Finished;
        }
        let settled = self.elapsed_s + TIME_EPSILON >= robot.extension.settle_time();
        self.elapsed_s += robot.dt();
        TaskStatus::from_done(settled)
    }
}

pub fn set_state(target: ExtensionState) -> SetExtension {
    SetExtension {
        target,
        settling: false,
        elapsed_s: 0.0,
    }
}

pub fn extend() -> SetExtension {
    set_state(ExtensionState::Extended)
}

pub fn retract() -> SetExtension {
    set_state(ExtensionState::Retracted)
}

// ─── Tests ──────────────────────────────────────────────────────────
