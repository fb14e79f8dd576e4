//! Arm chain solver: shoulder → elbow → wrist twist → wrist
//!
//! Each joint is the shortest arc from its rest direction to the observed
//! segment direction, measured in the space of everything above it.

use akira_core::Side;
use glam::{Quat, Vec3};

use crate::math::{local_arc, shortest_arc, to_parent_local, twist_about};
use crate::CalibrationProfile;

/// Filtered body points of one arm
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmPoints {
    pub shoulder: Option<Vec3>,
    pub elbow: Option<Vec3>,
    pub wrist: Option<Vec3>,
}

/// Hand points of the same side (from the hand detector)
#[derive(Debug, Clone, Copy, Default)]
pub struct HandPoints {
    pub wrist: Option<Vec3>,
    pub index_mcp: Option<Vec3>,
    pub middle_mcp: Option<Vec3>,
    pub ring_mcp: Option<Vec3>,
}

/// Local rotations of one arm chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmRotations {
    pub shoulder: Quat,
    pub elbow: Quat,
    pub wrist_twist: Quat,
    pub wrist: Quat,
}

impl Default for ArmRotations {
    fn default() -> Self {
        Self {
            shoulder: Quat::IDENTITY,
            elbow: Quat::IDENTITY,
            wrist_twist: Quat::IDENTITY,
            wrist: Quat::IDENTITY,
        }
    }
}

impl ArmRotations {
    /// World rotation of the hand: upper body through wrist
    pub fn hand_space(&self, upper_body: Quat) -> Quat {
        upper_body * self.shoulder * self.elbow * self.wrist_twist * self.wrist
    }
}

/// Solve one arm
///
/// Any joint whose points are missing or degenerate stays at identity; the
/// joints below it are still solved against that identity.
pub fn arm_rotations(
    side: Side,
    upper_body: Quat,
    arm: &ArmPoints,
    hand: &HandPoints,
    calibration: &CalibrationProfile,
) -> ArmRotations {
    let reference = calibration.arm(side);
    let mut out = ArmRotations::default();

    if let (Some(shoulder), Some(elbow)) = (arm.shoulder, arm.elbow) {
        out.shoulder =
            local_arc(upper_body, reference.shoulder, shoulder, elbow).unwrap_or(Quat::IDENTITY);
    }

    let upper_arm = upper_body * out.shoulder;
    if let (Some(elbow), Some(wrist)) = (arm.elbow, arm.wrist) {
        out.elbow = local_arc(upper_arm, reference.elbow, elbow, wrist).unwrap_or(Quat::IDENTITY);
    }

    let forearm = upper_arm * out.elbow;
    if let (Some(_), Some(index), Some(ring)) = (hand.wrist, hand.index_mcp, hand.ring_mcp) {
        out.wrist_twist = wrist_twist(forearm, index, ring, reference.wrist, calibration)
            .unwrap_or(Quat::IDENTITY);
    }

    let twisted = forearm * out.wrist_twist;
    if let (Some(wrist), Some(middle)) = (hand.wrist, hand.middle_mcp) {
        out.wrist = local_arc(twisted, reference.wrist, wrist, middle).unwrap_or(Quat::IDENTITY);
    }

    out
}

/// Forearm roll from the knuckle line, with the swing discarded
fn wrist_twist(
    forearm: Quat,
    index_mcp: Vec3,
    ring_mcp: Vec3,
    forearm_axis: Vec3,
    calibration: &CalibrationProfile,
) -> Option<Quat> {
    let across = (index_mcp - ring_mcp).try_normalize()?;
    let local = to_parent_local(forearm, across).try_normalize()?;
    let full = shortest_arc(calibration.hand_across, local);
    Some(twist_about(full, forearm_axis))
}
