//! Cooperative task layer.
//!
//! Tasks are polled once per tick; "waiting" means returning
//! [`TaskStatus::Running`]. Composition happens through the combinators in
//! [`group`], exclusivity through the requirement masks enforced by
//! [`runner::TaskRunner`].

pub mod group;
pub mod runner;
pub mod task;

pub use group::TaskExt;
pub use task::{BoxedTask, Outcome, Requirements, Task, TaskStatus};
