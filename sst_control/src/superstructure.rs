//! Superstructure state machine.
//!
//! Moves arm, extension and intake between the poses of the catalogue:
//!
//! ```text
//! retract (unless goal is within tolerance) ─► record pose ─► arm to angle ─► extension to pose state
//! ```
//!
//! Builders that branch on the game piece read it when the task is built;
//! changing the game piece later never alters a task already built.

use serde::Serialize;
use sst_common::robot::pose::{GamePiece, Pose};
use tracing::info;

use crate::command::group::{instant, none, sequence};
use crate::command::task::{BoxedTask, Requirements};
use crate::command::TaskExt;
use crate::mechanism::{arm, extension, intake};
use crate::robot::Robot;

/// Game piece selection and last commanded pose. Lives as long as the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SuperstructureState {
    game_piece: GamePiece,
    last_pose: Pose,
}

impl SuperstructureState {
    pub fn game_piece(&self) -> GamePiece {
        self.game_piece
    }

    pub fn set_game_piece(&mut self, piece: GamePiece) {
        if piece != self.game_piece {
            info!("game piece {:?} -> {:?}", self.game_piece, piece);
        }
        self.game_piece = piece;
    }

    pub fn last_pose(&self) -> Pose {
        self.last_pose
    }

    pub fn record_pose(&mut self, pose: Pose) {
        info!("superstructure pose -> {}", pose);
        self.last_pose = pose;
    }

    /// Outtake speed of the last commanded pose.
    pub fn outtake_speed(&self) -> f64 {
        self.last_pose.outtake_speed()
    }
}

/// Whether the arm may travel to `pose` without retracting first.
pub fn allow_move_while_extended(robot: &Robot, pose: Pose) -> bool {
    let tolerance = robot
        .config()
        .superstructure
        .retract_skip_tolerance_deg
        .to_radians();
    (robot.arm.goal() - pose.arm_angle()).abs() < tolerance
}

// ─── Pose Transitions ───────────────────────────────────────────────

/// Move to `pose`. The retract decision is made when the task starts.
pub fn set_pose(pose: Pose) -> BoxedTask {
    sequence(
        format!("set-pose {pose}"),
        vec![
            extension::retract()
                .unless(move |r| allow_move_while_extended(r, pose))
                .boxed(),
            instant("record-pose", Requirements::SUPERSTRUCTURE, move |r| {
                r.superstructure.record_pose(pose)
            })
            .boxed(),
            arm::set_goal_until_at_goal(pose.arm_angle()).boxed(),
            extension::set_state(pose.extension()).boxed(),
        ],
    )
    .boxed()
}

pub fn stow() -> BoxedTask {
    set_pose(Pose::Stow)
}

pub fn score_low_position(robot: &Robot) -> BoxedTask {
    match robot.superstructure.game_piece() {
        GamePiece::Cone => set_pose(Pose::ScoreConeLow),
        GamePiece::Cube => set_pose(Pose::ScoreCubeLow),
    }
}

pub fn score_mid_position(robot: &Robot) -> BoxedTask {
    match robot.superstructure.game_piece() {
        GamePiece::Cone => set_pose(Pose::ScoreConeMid),
        GamePiece::Cube => set_pose(Pose::ScoreCubeMid),
    }
}

/// No cone pose exists at the high node; with a cone this does nothing.
pub fn score_high_position(robot: &Robot) -> BoxedTask {
    match robot.superstructure.game_piece() {
        GamePiece::Cone => none().boxed(),
        GamePiece::Cube => set_pose(Pose::ScoreCubeHigh),
    }
}

pub fn intake_substation_position() -> BoxedTask {
    set_pose(Pose::SubstationPickup)
        .along_with(intake::open())
        .boxed()
}

pub fn floor_pickup() -> BoxedTask {
    set_pose(Pose::FloorPickupCube)
        .along_with(intake::open())
        .boxed()
}

pub fn shoot() -> BoxedTask {
    set_pose(Pose::CubeShoot)
}

// ─── Arm Adjustments ────────────────────────────────────────────────

/// Raise the arm goal above the last pose by the configured bump.
pub fn bump_up() -> BoxedTask {
    arm::set_goal_from(|r| {
        r.superstructure.last_pose().arm_angle()
            + r.config().superstructure.bump_up_deg.to_radians()
    })
    .named("bump-up")
    .boxed()
}

/// Lower the arm goal below the last pose by the configured bump.
pub fn bump_down() -> BoxedTask {
    arm::set_goal_from(|r| {
        r.superstructure.last_pose().arm_angle()
            + r.config().superstructure.bump_down_deg.to_radians()
    })
    .named("bump-down")
    .boxed()
}

/// Send the arm back to the last pose's angle, undoing any bump.
pub fn reset_arm_state() -> BoxedTask {
    arm::set_goal_from(|r| r.superstructure.last_pose().arm_angle())
        .named("reset-arm-state")
        .boxed()
}

pub fn set_game_piece(piece: GamePiece) -> BoxedTask {
    instant("set-game-piece", Requirements::empty(), move |r| {
        r.superstructure.set_game_piece(piece)
    })
    .boxed()
}

// ─── Game Piece Handling ────────────────────────────────────────────

/// Release the game piece.
///
/// Cone: open the jaw. Cube: eject at the last pose's outtake speed for the
/// configured duration.
pub fn score(robot: &Robot) -> BoxedTask {
    match robot.superstructure.game_piece() {
        GamePiece::Cone => instant("score-cone", Requirements::INTAKE, |r| {
            r.intake.open();
            r.intake.stop();
        })
        .boxed(),
        GamePiece::Cube => intake::eject(|r| r.superstructure.outtake_speed())
            .with_timeout(robot.config().intake.eject_duration_s)
            .named("score-cube")
            .boxed(),
    }
}

/// Cone: clamp and hold. Cube: pull in until stalled.
pub fn run_intake(robot: &Robot) -> BoxedTask {
    match robot.superstructure.game_piece() {
        GamePiece::Cone => intake::hold_closed().boxed(),
        GamePiece::Cube => intake::intake_cube().boxed(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
