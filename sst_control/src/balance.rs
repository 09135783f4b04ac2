//! Auto-balance on the charge station.
//!
//! ## Phases
//!
//! | Phase      | Output                                   | Leaves when                          |
//! |------------|------------------------------------------|--------------------------------------|
//! | Approach   | approach volts                           | debounced pitch past the trip angle  |
//! | Decelerate | decelerate volts for the decelerate time, then creep volts | debounced pitch rate past the rate trip |
//! | Hold       | ±bang-bang volts outside the deadband, 0 inside | never (canceled externally)   |
//!
//! Approach and decelerate values are signed by the direction; hold acts on
//! the raw pitch and is the same for both directions.

use serde::Serialize;
use sst_common::robot::config::{BalanceConfig, BalanceDirectionConfig};
use tracing::{debug, info};

use crate::command::task::{Outcome, Requirements, Task, TaskStatus};
use crate::control::filters::Debouncer;
use crate::robot::Robot;

const TIME_EPSILON: f64 = 1e-9;

/// Direction the robot drives onto the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub const fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalancePhase {
    Approach,
    Decelerate,
    Hold,
}

/// Per-invocation balance state. Built when a balance task starts and
/// dropped when it ends.
#[derive(Debug, Clone)]
pub struct BalanceSession {
    direction: Direction,
    params: BalanceDirectionConfig,
    balanced_threshold_deg: f64,
    bang_bang_volts: f64,

    phase: BalancePhase,
    pitch_trip: Debouncer,
    rate_trip: Debouncer,
    decelerate_elapsed_s: f64,
}

impl BalanceSession {
    pub fn new(direction: Direction, config: &BalanceConfig) -> Self {
        let params = match direction {
            Direction::Forward => config.forward.clone(),
            Direction::Backward => config.backward.clone(),
        };
        Self {
            direction,
            pitch_trip: Debouncer::new(params.pitch_debounce_s),
            rate_trip: Debouncer::new(params.rate_debounce_s),
            params,
            balanced_threshold_deg: config.balanced_threshold_deg,
            bang_bang_volts: config.bang_bang_volts,
            phase: BalancePhase::Approach,
            decelerate_elapsed_s: 0.0,
        }
    }

    pub fn phase(&self) -> BalancePhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Advance one tick and return the drive voltage for both sides.
    ///
    /// Without a pitch reading the output is zero and nothing advances.
    pub fn step(&mut self, pitch_deg: Option<f64>, pitch_rate_deg_s: f64, dt: f64) -> f64 {
        let Some(pitch) = pitch_deg else {
            return 0.0;
        };
        let s = self.direction.sign();

        if self.phase == BalancePhase::Approach {
            let tipped = s * pitch > self.params.pitch_trip_deg;
            if !self.pitch_trip.calculate(tipped, dt) {
                return s * self.params.approach_volts;
            }
            info!(
                "balance {:?}: pitch {:.1}° tripped, decelerating",
                self.direction, pitch
            );
            self.phase = BalancePhase::Decelerate;
            self.decelerate_elapsed_s = 0.0;
            self.rate_trip.reset();
        }

        if self.phase == BalancePhase::Decelerate {
            if self.decelerate_elapsed_s + TIME_EPSILON < self.params.decelerate_time_s {
                self.decelerate_elapsed_s += dt;
                return s * self.params.decelerate_volts;
            }
            let settling = s * pitch_rate_deg_s < -self.params.rate_trip_deg_s;
            if !self.rate_trip.calculate(settling, dt) {
                return s * self.params.creep_volts;
            }
            info!(
                "balance {:?}: pitch rate {:.1}°/s tripped, holding",
                self.direction, pitch_rate_deg_s
            );
            self.phase = BalancePhase::Hold;
        }

        self.hold(pitch)
    }

    fn hold(&self, pitch: f64) -> f64 {
        if pitch > self.balanced_threshold_deg {
            self.bang_bang_volts
        } else if pitch < -self.balanced_threshold_deg {
            -self.bang_bang_volts
        } else {
            0.0
        }
    }
}

// ─── Task ───────────────────────────────────────────────────────────

/// Run a balance session on the drivetrain until canceled.
pub struct AutoBalance {
    direction: Direction,
    session: Option<BalanceSession>,
}

impl Task for AutoBalance {
    fn name(&self) -> &str {
        match self.direction {
            Direction::Forward => "balance-forward",
            Direction::Backward => "balance-backward",
        }
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn initialize(&mut self, robot: &mut Robot) {
        self.session = Some(BalanceSession::new(self.direction, &robot.config().balance));
        robot.balance_phase = Some(BalancePhase::Approach);
    }

    fn execute(&mut self, robot: &mut Robot) -> TaskStatus {
        let dt = robot.dt();
        let pitch = robot.drivetrain.pitch();
        let rate = robot.drivetrain.pitch_rate();
        let (volts, phase) = match self.session.as_mut() {
            Some(session) => (session.step(pitch, rate, dt), Some(session.phase())),
            None => (0.0, None),
        };
        robot.drivetrain.set_voltages(volts, volts);
        robot.balance_phase = phase;
        TaskStatus::Running
    }

    fn end(&mut self, robot: &mut Robot, outcome: Outcome) {
        debug!("{} ended: {:?}", self.name(), outcome);
        robot.drivetrain.set_voltages(0.0, 0.0);
        robot.balance_phase = None;
        self.session = None;
    }
}

pub fn auto_balance(direction: Direction) -> AutoBalance {
    AutoBalance {
        direction,
        session: None,
    }
}

pub fn balance_forward() -> AutoBalance {
    auto_balance(Direction::Forward)
}

pub fn balance_backward() -> AutoBalance {
    auto_balance(Direction::Backward)
}

// ─── Tests ──────────────────────────────────────────────────────────
