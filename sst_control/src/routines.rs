//! Autonomous routine catalogue.
//!
//! Every routine is a fixed composition of superstructure, drivetrain and
//! balance tasks. Game-piece branches inside a routine are resolved when
//! [`build`] runs.

use clap::ValueEnum;
use serde::Serialize;

use crate::balance;
use crate::command::group::{none, sequence};
use crate::command::task::BoxedTask;
use crate::command::TaskExt;
use crate::mechanism::{arm, drivetrain};
use crate::robot::Robot;
use crate::superstructure;

const DRIVE_BACK_VOLTS: f64 = -3.0;
const DRIVE_BACK_TIME_S: f64 = 3.5;
const NUDGE_VOLTS: f64 = 3.0;
const NUDGE_TIME_S: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AutoRoutine {
    #[default]
    None,
    DriveBack,
    ScoreLowCube,
    ScoreMidCube,
    ScoreHighCube,
    LowCubeDriveBack,
    MidCubeDriveBack,
    HighCubeDriveBack,
    LowCubeBalance,
    MidCubeBalance,
    HighCubeBalance,
    BalanceForward,
    BalanceBackward,
}

impl AutoRoutine {
    pub const ALL: [AutoRoutine; 13] = [
        AutoRoutine::None,
        AutoRoutine::DriveBack,
        AutoRoutine::ScoreLowCube,
        AutoRoutine::ScoreMidCube,
        AutoRoutine::ScoreHighCube,
        AutoRoutine::LowCubeDriveBack,
        AutoRoutine::MidCubeDriveBack,
        AutoRoutine::HighCubeDriveBack,
        AutoRoutine::LowCubeBalance,
        AutoRoutine::MidCubeBalance,
        AutoRoutine::HighCubeBalance,
        AutoRoutine::BalanceForward,
        AutoRoutine::BalanceBackward,
    ];

    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default()
    }
}

/// Build the task for `routine` against the robot's current state.
pub fn build(routine: AutoRoutine, robot: &Robot) -> BoxedTask {
    let name = routine.name();
    match routine {
        AutoRoutine::None => none().boxed(),
        AutoRoutine::DriveBack => drive_back(),
        AutoRoutine::ScoreLowCube => score_low(robot),
        AutoRoutine::ScoreMidCube => score_mid(robot),
        AutoRoutine::ScoreHighCube => score_high(robot),
        AutoRoutine::LowCubeDriveBack => sequence(name, vec![score_low(robot), drive_back()]).boxed(),
        AutoRoutine::MidCubeDriveBack => sequence(name, vec![score_mid(robot), drive_back()]).boxed(),
        AutoRoutine::HighCubeDriveBack => {
            sequence(name, vec![score_high(robot), drive_back()]).boxed()
        }
        AutoRoutine::LowCubeBalance => {
            sequence(name, vec![score_low(robot), balance::balance_backward().boxed()]).boxed()
        }
        AutoRoutine::MidCubeBalance => {
            sequence(name, vec![score_mid(robot), balance::balance_backward().boxed()]).boxed()
        }
        AutoRoutine::HighCubeBalance => {
            sequence(name, vec![score_high(robot), balance::balance_backward().boxed()]).boxed()
        }
        AutoRoutine::BalanceForward => balance::balance_forward().boxed(),
        AutoRoutine::BalanceBackward => balance::balance_backward().boxed(),
    }
}

// ─── Building Blocks ────────────────────────────────────────────────

/// Reverse off the grid for a fixed time.
pub fn drive_back() -> BoxedTask {
    drivetrain::voltage(DRIVE_BACK_VOLTS, DRIVE_BACK_VOLTS)
        .with_timeout(DRIVE_BACK_TIME_S)
        .named("drive-back")
        .boxed()
}

/// Timed drive segment with the arm held alongside; the hold is torn down
/// when the segment's timeout fires.
fn nudge(volts: f64) -> BoxedTask {
    drivetrain::voltage(volts, volts)
        .with_timeout(NUDGE_TIME_S)
        .race_with(arm::hold())
        .boxed()
}

pub fn score_low(robot: &Robot) -> BoxedTask {
    sequence(
        "score-low",
        vec![
            superstructure::score_low_position(robot),
            superstructure::score(robot),
            superstructure::stow(),
        ],
    )
    .boxed()
}

pub fn score_mid(robot: &Robot) -> BoxedTask {
    sequence(
        "score-mid",
        vec![
            superstructure::score_mid_position(robot),
            superstructure::score(robot),
            superstructure::stow(),
        ],
    )
    .boxed()
}

/// Position, drive up to the node, score, back off, stow.
pub fn score_high(robot: &Robot) -> BoxedTask {
    sequence(
        "score-high",
        vec![
            superstructure::score_high_position(robot),
            nudge(NUDGE_VOLTS),
            superstructure::score(robot),
            nudge(-NUDGE_VOLTS),
            superstructure::stow(),
        ],
    )
    .boxed()
}

// ─── Tests ──────────────────────────────────────────────────────────
