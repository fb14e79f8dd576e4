//! Leg chain solver: hip and foot
//!
//! The knee is left to the rig's IK; only the thigh direction and the foot
//! yaw are driven here.

use glam::{Quat, Vec3};

use crate::math::{direction, local_arc, signed_yaw, to_parent_local};
use crate::{CalibrationProfile, HumanLimits};

/// Filtered body points of one leg
#[derive(Debug, Clone, Copy, Default)]
pub struct LegPoints {
    pub hip: Option<Vec3>,
    pub knee: Option<Vec3>,
    pub ankle: Option<Vec3>,
}

/// Rotations of one leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegRotations {
    /// Thigh, in lower body space
    pub hip: Quat,
    /// Foot yaw, written in world space
    pub ankle: Quat,
}

impl Default for LegRotations {
    fn default() -> Self {
        Self {
            hip: Quat::IDENTITY,
            ankle: Quat::IDENTITY,
        }
    }
}

/// Solve one leg
pub fn leg_rotations(
    lower_body: Quat,
    leg: &LegPoints,
    calibration: &CalibrationProfile,
    limits: &HumanLimits,
) -> LegRotations {
    let mut out = LegRotations::default();

    if let (Some(hip), Some(knee)) = (leg.hip, leg.knee) {
        out.hip = local_arc(lower_body, calibration.hip, hip, knee).unwrap_or(Quat::IDENTITY);
    }

    if let (Some(hip), Some(ankle)) = (leg.hip, leg.ankle) {
        out.ankle = foot_yaw(out.hip, hip, ankle, calibration, limits)
            .map(Quat::from_rotation_y)
            .unwrap_or(Quat::IDENTITY);
    }

    out
}

/// Yaw of the hip→ankle direction around +Y, seen from the thigh and clamped
fn foot_yaw(
    hip_rotation: Quat,
    hip: Vec3,
    ankle: Vec3,
    calibration: &CalibrationProfile,
    limits: &HumanLimits,
) -> Option<f32> {
    let dir = direction(hip, ankle)?;
    let local = to_parent_local(hip_rotation, dir);
    let yaw = signed_yaw(calibration.foot_forward, local)?;
    let [lo, hi] = limits.foot_yaw;
    Some(yaw.clamp(lo, hi))
}
