//! Task combinators.
//!
//! | Combinator     | Finishes when                             |
//! |----------------|-------------------------------------------|
//! | `sequence`     | the last step finishes                    |
//! | `race`         | any branch finishes (others are canceled) |
//! | `parallel`     | every branch has finished                 |
//! | `with_timeout` | the task finishes or time runs out        |
//! | `until`        | the task finishes or the predicate holds  |
//! | `either`       | the branch chosen at start finishes       |
//!
//! A sequence step that finishes on its first execute does not consume a
//! tick: the next step starts and executes in the same tick.

use tracing::debug;

use super::task::{BoxedTask, Outcome, Requirements, Task, TaskStatus};
use crate::robot::Robot;

/// Slack on accumulated-time comparisons.
const TIME_EPSILON: f64 = 1e-9;

pub type RobotAction = Box<dyn FnMut(&mut Robot)>;
pub type RobotPredicate = Box<dyn FnMut(&Robot) -> bool>;

fn union(tasks: &[BoxedTask]) -> Requirements {
    tasks
        .iter()
        .fold(Requirements::empty(), |acc, t| acc | t.requirements())
}

// ─── Sequence ───────────────────────────────────────────────────────

pub struct Sequence {
    name: String,
    steps: Vec<BoxedTask>,
    index: usize,
    requirements: Requirements,
}

impl Sequence {
    pub fn new(name: impl Into<String>, steps: Vec<BoxedTask>) -> Self {
        let requirements = union(&steps);
        Self {
            name: name.into(),
            steps,
            index: 0,
            requirements,
        }
    }
}

impl Task for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.index = 0;
        if let Some(first) = self.steps.first_mut() {
            first.initialize(robot);
        }
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        while let Some(step) = self.steps.get_mut(self.index) {
            if step.execute(robot) == TaskStatus::Running {
                return TaskStatus::Running;
            }
            step.end(robot, Outcome::Completed);
            debug!("{}: step {} ({}) done", self.name, self.index, step.name());
            self.index += 1;
            if let Some(next) = self.steps.get_mut(self.index) {
                next.initialize(robot);
            }
        }
        TaskStatus::Finished
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        // Later steps were never initialized and never start.
        if outcome == Outcome::Canceled {
            if let Some(step) = self.steps.get_mut(self.index) {
                step.end(robot, Outcome::Canceled);
            }
        }
    }
}

// ─── Race ───────────────────────────────────────────────────────────

pub struct Race {
    name: String,
    branches: Vec<BoxedTask>,
    finished: Vec<bool>,
    requirements: Requirements,
}

impl Race {
    pub fn new(name: impl Into<String>, branches: Vec<BoxedTask>) -> Self {
        let requirements = union(&branches);
        let finished = vec![false; branches.len()];
        Self {
            name: name.into(),
            branches,
            finished,
            requirements,
        }
    }
}

impl Task for Race {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.finished.fill(false);
        for branch in &mut self.branches {
            branch.initialize(robot);
        }
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        let mut any = false;
        for (branch, finished) in self.branches.iter_mut().zip(self.finished.iter_mut()) {
            *finished = branch.execute(robot) == TaskStatus::Finished;
            any |= *finished;
        }
        if !any {
            return TaskStatus::Running;
        }
        for (branch, finished) in self.branches.iter_mut().zip(self.finished.iter()) {
            let outcome = if *finished {
                Outcome::Completed
            } else {
                Outcome::Canceled
            };
            branch.end(robot, outcome);
        }
        debug!("{}: race decided", self.name);
        TaskStatus::Finished
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        // On completion the branches were already ended in `execute`.
        if outcome == Outcome::Canceled {
            for branch in &mut self.branches {
                branch.end(robot, Outcome::Canceled);
            }
        }
    }
}

// ─── Parallel ───────────────────────────────────────────────────────

pub struct Parallel {
    name: String,
    branches: Vec<(BoxedTask, bool)>,
    requirements: Requirements,
}

impl Parallel {
    pub fn new(name: impl Into<String>, branches: Vec<BoxedTask>) -> Self {
        let requirements = union(&branches);
        Self {
            name: name.into(),
            branches: branches.into_iter().map(|b| (b, false)).collect(),
            requirements,
        }
    }
}

impl Task for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements
    }

    fn initialize(&mut self, robot: &mut Robot) {
        for (branch, done) in &mut self.branches {
            *done = false;
            branch.initialize(robot);
        }
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        for (branch, done) in &mut self.branches {
            if !*done && branch.execute(robot) == TaskStatus::Finished {
                branch.end(robot, Outcome::Completed);
                *done = true;
            }
        }
        TaskStatus::from_done(self.branches.iter().all(|(_, done)| *done))
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        if outcome == Outcome::Canceled {
            for (branch, done) in &mut self.branches {
                if !*done {
                    branch.end(robot, Outcome::Canceled);
                }
            }
        }
    }
}

// ─── Wait ───────────────────────────────────────────────────────────

/// Finishes once `duration_s` of ticks have executed. Zero finishes at once.
pub struct Wait {
    duration_s: f64,
    elapsed_s: f64,
}

impl Wait {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            elapsed_s: 0.0,
        }
    }
}

impl Task for Wait {
    fn name(&self) -> &str {
        "wait"
    }

    fn initialize(&mut self, _robot: &mut Robot) {
        self.elapsed_s = 0.0;
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        if self.duration_s <= 0.0 {
            return TaskStatus::Finished;
        }
        self.elapsed_s += robot.dt();
        TaskStatus::from_done(self.elapsed_s + TIME_EPSILON >= self.duration_s)
    }
}

// ─── Until ──────────────────────────────────────────────────────────

/// Runs `inner` until it finishes or `predicate` holds after an execute.
pub struct Until {
    name: String,
    inner: BoxedTask,
    predicate: RobotPredicate,
}

impl Task for Until {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.inner.initialize(robot);
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        if self.inner.execute(robot) == TaskStatus::Finished {
            self.inner.end(robot, Outcome::Completed);
            return TaskStatus::Finished;
        }
        if (self.predicate)(robot) {
            self.inner.end(robot, Outcome::Canceled);
            return TaskStatus::Finished;
        }
        TaskStatus::Running
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        if outcome == Outcome::Canceled {
            self.inner.end(robot, Outcome::Canceled);
        }
    }
}

// ─── Conditional ────────────────────────────────────────────────────

/// Picks one of two tasks when it starts; the choice is never revisited.
pub struct Conditional {
    name: String,
    on_true: BoxedTask,
    on_false: BoxedTask,
    predicate: RobotPredicate,
    chosen: Option<bool>,
}

impl Conditional {
    fn selected(&mut self) -> Option<&mut BoxedTask> {
        match self.chosen {
            Some(true) => Some(&mut self.on_true),
            Some(false) => Some(&mut self.on_false),
            None => None,
        }
    }
}

impl Task for Conditional {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.on_true.requirements() | self.on_false.requirements()
    }

    fn initialize(&mut self, robot: &mut Robot) {
        let choice = (self.predicate)(robot);
        debug!("{}: took {} branch", self.name, choice);
        self.chosen = Some(choice);
        if let Some(task) = self.selected() {
            task.initialize(robot);
        }
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        match self.selected() {
            Some(task) => task.execute(robot),
            None => TaskStatus::Finished,
        }
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        if let Some(task) = self.selected() {
            task.end(robot, outcome);
        }
        self.chosen = None;
    }
}

// ─── Closure Tasks ──────────────────────────────────────────────────

/// Task assembled from closures.
pub struct FnTask {
    name: String,
    requirements: Requirements,
    on_start: Option<RobotAction>,
    on_execute: Option<RobotAction>,
    on_end: Option<RobotAction>,
    finish_after_execute: bool,
}

impl FnTask {
    fn new(name: impl Into<String>, requirements: Requirements) -> Self {
        Self {
            name: name.into(),
            requirements,
            on_start: None,
            on_execute: None,
            on_end: None,
            finish_after_execute: false,
        }
    }
}

impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.requirements
    }

    fn initialize(&mut self, robot: &mut Robot) {
        if let Some(f) = self.on_start.as_mut() {
            f(robot);
        }
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        if let Some(f) = self.on_execute.as_mut() {
            f(robot);
        }
        TaskStatus::from_done(self.finish_after_execute)
    }

    fn end(&mut self, robot: &mut Robot, _outcome: Outcome) {
        if let Some(f) = self.on_end.as_mut() {
            f(robot);
        }
    }
}

/// Renames a task without changing its behavior.
pub struct Named<T> {
    name: String,
    inner: T,
}

impl<T: Task> Task for Named<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.inner.initialize(robot);
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        self.inner.execute(robot)
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        self.inner.end(robot, outcome);
    }
}

// ─── Constructors ───────────────────────────────────────────────────

pub fn sequence(name: impl Into<String>, steps: Vec<BoxedTask>) -> Sequence {
    Sequence::new(name, steps)
}

pub fn race(name: impl Into<String>, branches: Vec<BoxedTask>) -> Race {
    Race::new(name, branches)
}

pub fn parallel(name: impl Into<String>, branches: Vec<BoxedTask>) -> Parallel {
    Parallel::new(name, branches)
}

pub fn wait(duration_s: f64) -> Wait {
    Wait::new(duration_s)
}

/// Choose `on_true` or `on_false` by evaluating `predicate` at start.
pub fn either(
    on_true: impl Task + 'static,
    on_false: impl Task + 'static,
    predicate: impl FnMut(&Robot) -> bool + 'static,
) -> Conditional {
    let name = format!("either({}, {})", on_true.name(), on_false.name());
    Conditional {
        name,
        on_true: Box::new(on_true),
        on_false: Box::new(on_false),
        predicate: Box::new(predicate),
        chosen: None,
    }
}

/// Finishes immediately without doing anything.
pub fn none() -> FnTask {
    FnTask {
        finish_after_execute: true,
        ..FnTask::new("none", Requirements::empty())
    }
}

/// Runs `action` once and finishes in the same tick.
pub fn instant(
    name: impl Into<String>,
    requirements: Requirements,
    action: impl FnMut(&mut Robot) + 'static,
) -> FnTask {
    FnTask {
        on_execute: Some(Box::new(action)),
        finish_after_execute: true,
        ..FnTask::new(name, requirements)
    }
}

/// Runs `action` every tick until canceled.
pub fn run(
    name: impl Into<String>,
    requirements: Requirements,
    action: impl FnMut(&mut Robot) + 'static,
) -> FnTask {
    FnTask {
        on_execute: Some(Box::new(action)),
        ..FnTask::new(name, requirements)
    }
}

/// Runs `action` every tick; runs `on_end` however the task ends.
pub fn run_end(
    name: impl Into<String>,
    requirements: Requirements,
    action: impl FnMut(&mut Robot) + 'static,
    on_end: impl FnMut(&mut Robot) + 'static,
) -> FnTask {
    FnTask {
        on_execute: Some(Box::new(action)),
        on_end: Some(Box::new(on_end)),
        ..FnTask::new(name, requirements)
    }
}

/// Runs `on_start` once, idles until canceled, then runs `on_end`.
pub fn start_end(
    name: impl Into<String>,
    requirements: Requirements,
    on_start: impl FnMut(&mut Robot) + 'static,
    on_end: impl FnMut(&mut Robot) + 'static,
) -> FnTask {
    FnTask {
        on_start: Some(Box::new(on_start)),
        on_end: Some(Box::new(on_end)),
        ..FnTask::new(name, requirements)
    }
}

// ─── Extension Trait ────────────────────────────────────────────────

/// Fluent composition on any task.
pub trait TaskExt: Task + Sized + 'static {
    fn boxed(self) -> BoxedTask {
        Box::new(self)
    }

    fn and_then(self, next: impl Task + 'static) -> Sequence {
        let name = format!("{} > {}", self.name(), next.name());
        Sequence::new(name, vec![self.boxed(), Box::new(next)])
    }

    fn race_with(self, other: impl Task + 'static) -> Race {
        let name = format!("{} | {}", self.name(), other.name());
        Race::new(name, vec![self.boxed(), Box::new(other)])
    }

    fn along_with(self, other: impl Task + 'static) -> Parallel {
        let name = format!("{} & {}", self.name(), other.name());
        Parallel::new(name, vec![self.boxed(), Box::new(other)])
    }

    fn with_timeout(self, seconds: f64) -> Race {
        let name = format!("{} (timeout {seconds}s)", self.name());
        Race::new(name, vec![self.boxed(), Box::new(Wait::new(seconds))])
    }

    fn until(self, predicate: impl FnMut(&Robot) -> bool + 'static) -> Until {
        Until {
            name: format!("{} (until)", self.name()),
            inner: self.boxed(),
            predicate: Box::new(predicate),
        }
    }

    /// Skip the task entirely when `predicate` holds at start.
    fn unless(self, predicate: impl FnMut(&Robot) -> bool + 'static) -> Conditional {
        let name = format!("{} (unless)", self.name());
        Conditional {
            name,
            on_true: Box::new(none()),
            on_false: self.boxed(),
            predicate: Box::new(predicate),
            chosen: None,
        }
    }

    fn named(self, name: impl Into<String>) -> Named<Self> {
        Named {
            name: name.into(),
            inner: self,
        }
    }
}

impl<T: Task + 'static> TaskExt for T {}

// ─── Tests ──────────────────────────────────────────────────────────
