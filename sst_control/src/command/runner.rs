//! Task runner with requirement exclusivity.
//!
//! Scheduling a task cancels every running task whose requirements intersect
//! the new one, so no two running tasks ever write the same subsystem. Tasks
//! with no requirements coexist with everything.

use tracing::{debug, info};

use super::task::{BoxedTask, Outcome, Requirements, TaskStatus};
use crate::robot::Robot;

struct ActiveTask {
    task: BoxedTask,
    requirements: Requirements,
}

#[derive(Default)]
pub struct TaskRunner {
    active: Vec<ActiveTask>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `task`, canceling conflicting tasks first.
    ///
    /// The task is initialized immediately and executes from the next
    /// [`run`](Self::run) on.
    pub fn schedule(&mut self, robot: &mut Robot, mut task: BoxedTask) {
        let requirements = task.requirements();
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].requirements.intersects(requirements) {
                let mut displaced = self.active.remove(i);
                info!(
                    "'{}' canceled by '{}'",
                    displaced.task.name(),
                    task.name()
                );
                displaced.task.end(robot, Outcome::Canceled);
            } else {
                i += 1;
            }
        }

        info!("starting '{}' ({:?})", task.name(), requirements);
        task.initialize(robot);
        self.active.push(ActiveTask { task, requirements });
    }

    /// Execute every running task once; retire the ones that finish.
    pub fn run(&mut self, robot: &mut Robot) {
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].task.execute(robot) == TaskStatus::Finished {
                let mut done = self.active.remove(i);
                done.task.end(robot, Outcome::Completed);
                info!("'{}' completed", done.task.name());
            } else {
                i += 1;
            }
        }
    }

    /// Cancel every running task.
    pub fn cancel_all(&mut self, robot: &mut Robot) {
        for mut entry in self.active.drain(..) {
            debug!("canceling '{}'", entry.task.name());
            entry.task.end(robot, Outcome::Canceled);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Names of the running tasks, in scheduling order.
    pub fn active_names(&self) -> Vec<&str> {
        self.active.iter().map(|t| t.task.name()).collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
