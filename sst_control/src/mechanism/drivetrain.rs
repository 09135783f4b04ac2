//! Drivetrain output and chassis pitch.
//!
//! Only the parts the core needs: left/right voltage outputs and the
//! chassis pitch with its rate estimate for auto-balance.

use sst_common::config::ConfigError;
use sst_common::robot::config::CycleConfig;

use crate::command::group::{FnTask, run_end};
use crate::command::task::Requirements;
use crate::control::filters::BackwardDifference;

#[derive(Debug, Clone)]
pub struct Drivetrain {
    supply: f64,
    dt: f64,
    left_volts: f64,
    right_volts: f64,
    driven: bool,
    pitch_deg: Option<f64>,
    pitch_rate_deg_s: f64,
    rate: BackwardDifference,
}

impl Drivetrain {
    pub fn new(cycle: &CycleConfig) -> Result<Self, ConfigError> {
        cycle.validate()?;
        Ok(Self {
            supply: cycle.supply_voltage,
            dt: cycle.tick_period_s,
            left_volts: 0.0,
            right_volts: 0.0,
            driven: false,
            pitch_deg: None,
            pitch_rate_deg_s: 0.0,
            rate: BackwardDifference::default(),
        })
    }

    /// Feed this tick's pitch sample. A dropout clears the rate estimate so
    /// the next valid sample re-seeds it.
    pub fn ingest_pitch(&mut self, pitch_deg: Option<f64>) {
        self.pitch_deg = pitch_deg;
        match pitch_deg {
            Some(p) => self.pitch_rate_deg_s = self.rate.calculate(p, self.dt),
            None => {
                self.rate.reset();
                self.pitch_rate_deg_s = 0.0;
            }
        }
    }

    pub fn pitch(&self) -> Option<f64> {
        self.pitch_deg
    }

    pub fn pitch_rate(&self) -> f64 {
        self.pitch_rate_deg_s
    }

    pub fn set_voltages(&mut self, left: f64, right: f64) {
        self.left_volts = left.clamp(-self.supply, self.supply);
        self.right_volts = right.clamp(-self.supply, self.supply);
        self.driven = true;
    }

    pub fn voltages(&self) -> (f64, f64) {
        (self.left_volts, self.right_volts)
    }

    pub fn begin_tick(&mut self) {
        self.driven = false;
    }

    /// Zero the outputs if nothing drove them since [`begin_tick`](Self::begin_tick).
    pub fn finish_tick(&mut self) {
        if !self.driven {
            self.left_volts = 0.0;
            self.right_volts = 0.0;
        }
    }
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// Drive both sides at fixed voltages until canceled; zero on end.
pub fn voltage(left: f64, right: f64) -> FnTask {
    run_end(
        "drive-voltage",
        Requirements::DRIVETRAIN,
        move |r| r.drivetrain.set_voltages(left, right),
        |r| r.drivetrain.set_voltages(0.0, 0.0),
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
