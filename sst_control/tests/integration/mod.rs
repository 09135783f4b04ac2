//! Shared closed-loop harness for the integration tests.

mod balance;
mod config;
mod convergence;
mod scenarios;
mod superstructure;

use sst_common::robot::config::CoreConfig;
use sst_common::robot::io::{ActuatorFrame, RobotMode};
use sst_control::command::task::BoxedTask;
use sst_control::cycle::ControlCore;
use sst_control::sim::charge_station::Approach;
use sst_control::sim::{RobotDriver, SimulatedRobot};

/// Control core wired to the simulated robot, one tick per `step()`.
pub struct SimHarness {
    pub core: ControlCore,
    pub sim: SimulatedRobot,
    dt: f64,
}

impl SimHarness {
    /// Default configuration, one disabled tick to seed the arm, then
    /// autonomous mode from the next tick on.
    pub fn new(approach: Approach) -> Self {
        Self::with_config(CoreConfig::default(), approach)
    }

    pub fn with_config(config: CoreConfig, approach: Approach) -> Self {
        let dt = config.cycle.tick_period_s;
        let core = ControlCore::new(config).unwrap();
        let mut harness = Self {
            core,
            sim: SimulatedRobot::new(approach),
            dt,
        };
        harness.step();
        harness.sim.set_mode(RobotMode::Autonomous);
        harness
    }

    pub fn step(&mut self) -> ActuatorFrame {
        let input = self.sim.read().unwrap();
        let frame = self.core.tick(&input);
        self.sim.write(&frame, self.dt).unwrap();
        frame
    }

    pub fn schedule(&mut self, task: BoxedTask) {
        self.core.schedule(task);
    }

    /// Step until no task is running; the number of ticks it took.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Option<usize> {
        for tick in 1..=max_ticks {
            self.step();
            if self.core.is_idle() {
                return Some(tick);
            }
        }
        None
    }

    pub fn run(&mut self, ticks: usize) -> Vec<ActuatorFrame> {
        (0..ticks).map(|_| self.step()).collect()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

/// Degrees to radians.
pub fn rad(deg: f64) -> f64 {
    deg.to_radians()
}
