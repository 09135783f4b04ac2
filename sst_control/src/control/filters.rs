//! Signal conditioning filters.
//!
//! Rising-edge debouncer, two-sample backward finite difference and a
//! fixed-capacity moving average. All of them advance by an explicit `dt`
//! supplied by the caller; none reads a clock.

use heapless::Deque;
use sst_common::consts::MAX_FILTER_TAPS;

/// Slack on accumulated-time comparisons.
const TIME_EPSILON: f64 = 1e-9;

// ─── Debouncer ──────────────────────────────────────────────────────

/// Rising-edge debouncer.
///
/// Output turns true once the input has been true for `window_s` without
/// interruption; any false sample restarts the window. Held time starts at
/// zero on the first true sample, so a zero window passes the first true
/// sample straight through.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window_s: f64,
    held_s: Option<f64>,
}

impl Debouncer {
    pub const fn new(window_s: f64) -> Self {
        Self {
            window_s,
            held_s: None,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.held_s = None;
    }

    pub fn calculate(&mut self, input: bool, dt: f64) -> bool {
        if !input {
            self.held_s = None;
            return false;
        }
        let held = match self.held_s {
            Some(h) => h + dt,
            None => 0.0,
        };
        self.held_s = Some(held);
        held + TIME_EPSILON >= self.window_s
    }
}

// ─── Backward Finite Difference ─────────────────────────────────────

/// First derivative from the last two samples: `(x[n] − x[n−1]) / dt`.
///
/// Seeded with the first sample after construction or reset, which yields
/// zero instead of a start-up spike.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardDifference {
    prev: Option<f64>,
}

impl BackwardDifference {
    #[inline]
    pub fn reset(&mut self) {
        self.prev = None;
    }

    pub fn calculate(&mut self, sample: f64, dt: f64) -> f64 {
        let rate = match self.prev {
            Some(prev) if dt > 0.0 => (sample - prev) / dt,
            _ => 0.0,
        };
        self.prev = Some(sample);
        rate
    }
}

// ─── Moving Average ─────────────────────────────────────────────────

/// Mean of the last `taps` samples (fewer until the window fills).
#[derive(Debug, Clone)]
pub struct MovingAverage {
    taps: usize,
    window: Deque<f64, MAX_FILTER_TAPS>,
    sum: f64,
}

impl MovingAverage {
    /// `taps` is clamped into `1..=MAX_FILTER_TAPS`.
    pub fn new(taps: usize) -> Self {
        Self {
            taps: taps.clamp(1, MAX_FILTER_TAPS),
            window: Deque::new(),
            sum: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }

    pub fn calculate(&mut self, sample: f64) -> f64 {
        if self.window.len() >= self.taps {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }
        if self.window.push_back(sample).is_ok() {
            self.sum += sample;
        }
        self.value()
    }

    pub fn value(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.sum / self.window.len() as f64
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
