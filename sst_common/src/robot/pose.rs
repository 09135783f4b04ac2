//! Superstructure pose catalogue.
//!
//! Each [`Pose`] names one immutable record {arm angle, extension state,
//! outtake speed}. The table is fixed at compile time; nothing mutates it.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Outtake roller speed used by poses without a dedicated value.
pub const DEFAULT_OUTTAKE: f64 = 0.35;

/// Extension cylinder position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExtensionState {
    Extended,
    #[default]
    Retracted,
}

/// Game piece currently handled by the intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GamePiece {
    #[default]
    Cube,
    Cone,
}

impl GamePiece {
    #[inline]
    pub const fn is_cone(&self) -> bool {
        matches!(self, Self::Cone)
    }
}

/// Named superstructure target configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Pose {
    #[default]
    Stow,
    SubstationPickup,
    ScoreConeLow,
    ScoreConeMid,
    ScoreCubeLow,
    ScoreCubeMid,
    ScoreCubeHigh,
    FloorPickupCube,
    FloorPickupCone,
    CubeShoot,
}

const_assert_eq!(Pose::ALL.len(), 10);

/// Immutable record behind a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseRecord {
    /// Arm angle [deg], 0 = horizontal, negative = below horizontal.
    pub arm_angle_deg: f64,
    pub extension: ExtensionState,
    /// Roller speed used when scoring from this pose (−1..1).
    pub outtake_speed: f64,
}

impl PoseRecord {
    const fn retracted(arm_angle_deg: f64, outtake_speed: f64) -> Self {
        Self {
            arm_angle_deg,
            extension: ExtensionState::Retracted,
            outtake_speed,
        }
    }

    const fn extended(arm_angle_deg: f64, outtake_speed: f64) -> Self {
        Self {
            arm_angle_deg,
            extension: ExtensionState::Extended,
            outtake_speed,
        }
    }
}

impl Pose {
    /// Every pose, in declaration order.
    pub const ALL: [Pose; 10] = [
        Pose::Stow,
        Pose::SubstationPickup,
        Pose::ScoreConeLow,
        Pose::ScoreConeMid,
        Pose::ScoreCubeLow,
        Pose::ScoreCubeMid,
        Pose::ScoreCubeHigh,
        Pose::FloorPickupCube,
        Pose::FloorPickupCone,
        Pose::CubeShoot,
    ];

    /// Catalogue lookup.
    pub const fn record(&self) -> PoseRecord {
        match self {
            Pose::Stow => PoseRecord::retracted(-80.0, DEFAULT_OUTTAKE),
            Pose::SubstationPickup => PoseRecord::retracted(-8.0, DEFAULT_OUTTAKE),
            Pose::ScoreConeLow => PoseRecord::retracted(-36.0, DEFAULT_OUTTAKE),
            Pose::ScoreConeMid => PoseRecord::extended(-6.0, DEFAULT_OUTTAKE),
            Pose::ScoreCubeLow => PoseRecord::retracted(-60.0, 0.2),
            Pose::ScoreCubeMid => PoseRecord::retracted(-26.0, 0.5),
            Pose::ScoreCubeHigh => PoseRecord::retracted(-8.0, DEFAULT_OUTTAKE),
            Pose::FloorPickupCube => PoseRecord::extended(-52.0, DEFAULT_OUTTAKE),
            Pose::FloorPickupCone => PoseRecord::extended(-56.0, DEFAULT_OUTTAKE),
            Pose::CubeShoot => PoseRecord::retracted(5.0, 1.0),
        }
    }

    /// Arm angle [rad].
    #[inline]
    pub fn arm_angle(&self) -> f64 {
        self.record().arm_angle_deg.to_radians()
    }

    #[inline]
    pub const fn extension(&self) -> ExtensionState {
        self.record().extension
    }

    #[inline]
    pub const fn outtake_speed(&self) -> f64 {
        self.record().outtake_speed
    }

    /// Short display name used in logs and telemetry.
    pub const fn name(&self) -> &'static str {
        match self {
            Pose::Stow => "stow",
            Pose::SubstationPickup => "substation-pickup",
            Pose::ScoreConeLow => "score-cone-low",
            Pose::ScoreConeMid => "score-cone-mid",
            Pose::ScoreCubeLow => "score-cube-low",
            Pose::ScoreCubeMid => "score-cube-mid",
            Pose::ScoreCubeHigh => "score-cube-high",
            Pose::FloorPickupCube => "floor-pickup-cube",
            Pose::FloorPickupCone => "floor-pickup-cone",
            Pose::CubeShoot => "cube-shoot",
        }
    }
}

impl core::fmt::Display for Pose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ARM_MAX_ANGLE_DEG, ARM_MIN_ANGLE_DEG};

    #[test]
    fn stow_is_default() {
        assert_eq!(Pose::default(), Pose::Stow);
        assert_eq!(Pose::Stow.arm_angle(), (-80.0f64).to_radians());
    }

    #[test]
    fn catalogue_angles_within_mechanical_range() {
        for pose in Pose::ALL {
            let deg = pose.record().arm_angle_deg;
            assert!(
                (ARM_MIN_ANGLE_DEG..=ARM_MAX_ANGLE_DEG).contains(&deg),
                "{pose} at {deg} deg"
            );
        }
    }

    #[test]
    fn extended_poses() {
        let extended: Vec<Pose> = Pose::ALL
            .into_iter()
            .filter(|p| p.extension() == ExtensionState::Extended)
            .collect();
        assert_eq!(
            extended,
            vec![Pose::ScoreConeMid, Pose::FloorPickupCube, Pose::FloorPickupCone]
        );
    }

    #[test]
    fn cube_mid_is_retracted_with_half_outtake() {
        let rec = Pose::ScoreCubeMid.record();
        assert_eq!(rec.arm_angle_deg, -26.0);
        assert_eq!(rec.extension, ExtensionState::Retracted);
        assert_eq!(rec.outtake_speed, 0.5);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Pose::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Pose::ALL.len());
    }
}
