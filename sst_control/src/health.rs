//! Sensor health tracking and status display colour.
//!
//! Both are plain components owned by the robot context and updated once per
//! tick by the control cycle.

use serde::Serialize;
use sst_common::robot::fault::Faults;
use sst_common::robot::io::{Alliance, RobotMode, SensorFrame};
use sst_common::robot::pose::GamePiece;
use tracing::{info, warn};

/// Flags for every sensor missing from `sensors`.
pub fn observe_faults(sensors: &SensorFrame) -> Faults {
    let mut faults = Faults::empty();
    if sensors.arm_position.is_none_or(|v| !v.is_finite()) {
        faults |= Faults::ARM_POSITION_SENSOR;
    }
    if sensors.arm_velocity.is_none_or(|v| !v.is_finite()) {
        faults |= Faults::ARM_VELOCITY_SENSOR;
    }
    if sensors.pitch_deg.is_none_or(|v| !v.is_finite()) {
        faults |= Faults::PITCH_SENSOR;
    }
    if sensors.intake_current.is_none_or(|v| !v.is_finite()) {
        faults |= Faults::INTAKE_CURRENT_SENSOR;
    }
    faults
}

/// Copy of `sensors` with every non-finite reading replaced by `None`.
pub fn sanitize(sensors: &SensorFrame) -> SensorFrame {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    SensorFrame {
        arm_position: finite(sensors.arm_position),
        arm_velocity: finite(sensors.arm_velocity),
        pitch_deg: finite(sensors.pitch_deg),
        intake_current: finite(sensors.intake_current),
    }
}

// ─── Health Monitor ─────────────────────────────────────────────────

const FAULT_COUNT: usize = 4;

/// Active, latched and per-fault consecutive-tick bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct HealthMonitor {
    active: Faults,
    latched: Faults,
    consecutive: [u32; FAULT_COUNT],
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this tick's faults and log every edge.
    pub fn update(&mut self, observed: Faults) {
        let raised = observed.difference(self.active);
        let cleared = self.active.difference(observed);
        for name in raised.names() {
            warn!("sensor fault raised: {}", name);
        }
        for name in cleared.names() {
            info!("sensor fault cleared: {}", name);
        }

        for (slot, flag) in self.consecutive.iter_mut().zip(Faults::all().iter()) {
            *slot = if observed.contains(flag) {
                slot.saturating_add(1)
            } else {
                0
            };
        }

        self.active = observed;
        self.latched |= observed;
    }

    /// Faults present this tick.
    pub fn active(&self) -> Faults {
        self.active
    }

    /// Every fault seen since construction or the last [`clear_latched`](Self::clear_latched).
    pub fn latched(&self) -> Faults {
        self.latched
    }

    pub fn clear_latched(&mut self) {
        self.latched = self.active;
    }

    /// Ticks in a row `fault` has been active. `fault` must be a single flag.
    pub fn consecutive(&self, fault: Faults) -> u32 {
        Faults::all()
            .iter()
            .position(|f| f == fault)
            .map_or(0, |i| self.consecutive[i])
    }
}

// ─── Status Display ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

/// Status LED colour selection.
#[derive(Debug, Clone, Default)]
pub struct StatusDisplay {
    brake_display: bool,
    color: StatusColor,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_brake_display(&mut self, on: bool) {
        self.brake_display = on;
    }

    pub fn brake_display(&self) -> bool {
        self.brake_display
    }

    /// Disabled shows the alliance (red when unknown); enabled shows green
    /// for brake display, otherwise the selected game piece.
    pub fn update(
        &mut self,
        mode: RobotMode,
        alliance: Option<Alliance>,
        game_piece: GamePiece,
    ) -> StatusColor {
        self.color = if !mode.is_enabled() {
            match alliance {
                Some(Alliance::Blue) => StatusColor::Blue,
                _ => StatusColor::Red,
            }
        } else if self.brake_display {
            StatusColor::Green
        } else if game_piece.is_cone() {
            StatusColor::Yellow
        } else {
            StatusColor::Purple
        };
        self.color
    }

    pub fn color(&self) -> StatusColor {
        self.color
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
