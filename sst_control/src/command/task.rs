//! Task contract.
//!
//! ## Lifecycle
//!
//! 1. `initialize()`: once, when the task starts
//! 2. `execute()`: once per tick until it returns [`TaskStatus::Finished`]
//! 3. `end()`: once, with [`Outcome::Completed`] after finishing or
//!    [`Outcome::Canceled`] when interrupted
//!
//! A task that is canceled before it was initialized never sees `end()`.

use bitflags::bitflags;
use serde::Serialize;

use crate::robot::Robot;

bitflags! {
    /// Subsystems a task writes to. Two running tasks never share a bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Requirements: u8 {
        const ARM            = 0x01;
        const EXTENSION      = 0x02;
        const INTAKE         = 0x04;
        const DRIVETRAIN     = 0x08;
        const SUPERSTRUCTURE = 0x10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Finished,
}

impl TaskStatus {
    #[inline]
    pub const fn from_done(done: bool) -> Self {
        if done { Self::Finished } else { Self::Running }
    }
}

/// How a task ended. Cancellation is a normal termination, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Completed,
    Canceled,
}

pub trait Task {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    fn requirements(&self) -> Requirements {
        Requirements::empty()
    }

    fn initialize(&mut self, _robot: &mut Robot) {}

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus;

    fn end(&mut self, _robot: &mut Robot, _outcome: Outcome) {}
}

pub type BoxedTask = Box<dyn Task>;

impl Task for BoxedTask {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requirements(&self) -> Requirements {
        (**self).requirements()
    }

    fn initialize(&mut self, robot: &mut Robot) {
        (**self).initialize(robot)
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        (**self).execute(robot)
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        (**self).end(robot, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_overlap() {
        let set_pose = Requirements::ARM | Requirements::EXTENSION | Requirements::SUPERSTRUCTURE;
        assert!(set_pose.intersects(Requirements::ARM));
        assert!(!set_pose.intersects(Requirements::DRIVETRAIN | Requirements::INTAKE));
    }

    #[test]
    fn status_from_done() {
        assert_eq!(TaskStatus::from_done(true), TaskStatus::Finished);
        assert_eq!(TaskStatus::from_done(false), TaskStatus::Running);
    }
}
