//! Trunk solvers: upper body, lower body, neck and head
//!
//! All inputs are world-space points with +Y up.

use glam::{Mat3, Quat, Vec3};

use crate::math::{center, direction, local_arc, shortest_arc, to_parent_local};
use crate::CalibrationProfile;

/// Left/right pair of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    pub left: Vec3,
    pub right: Vec3,
}

impl Pair {
    pub fn new(left: Vec3, right: Vec3) -> Self {
        Self { left, right }
    }

    /// Both points, if both are present
    pub fn from_options(left: Option<Vec3>, right: Option<Vec3>) -> Option<Self> {
        Some(Self {
            left: left?,
            right: right?,
        })
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        center(self.left, self.right)
    }

    /// Unit vector from right to left
    #[inline]
    pub fn across(&self) -> Option<Vec3> {
        direction(self.right, self.left)
    }
}

/// Upper body orientation from the shoulder line and the spine
///
/// X runs right to left shoulder, Y up the spine (orthogonalized against X),
/// Z completes a right-handed basis.
pub fn upper_body_rotation(shoulders: Pair, hips: Pair) -> Option<Quat> {
    let x = shoulders.across()?;
    let spine = shoulders.center() - hips.center();
    let y = (spine - x * spine.dot(x)).try_normalize()?;
    let z = x.cross(y);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

/// Lower body orientation: the hip line against the horizontal reference
pub fn lower_body_rotation(hips: Pair, calibration: &CalibrationProfile) -> Option<Quat> {
    let across = hips.across()?;
    Some(shortest_arc(calibration.horizontal, across))
}

/// Neck: shoulder center to ear center, in upper body space
pub fn neck_rotation(
    upper_body: Quat,
    ears: Pair,
    shoulders: Pair,
    calibration: &CalibrationProfile,
) -> Option<Quat> {
    local_arc(upper_body, calibration.neck, shoulders.center(), ears.center())
}

/// Head: horizontal twist from the ear line composed with the vertical bend
/// from ear center to eye center, both in neck space
pub fn head_rotation(
    parent: Quat,
    ears: Pair,
    eyes: Pair,
    calibration: &CalibrationProfile,
) -> Option<Quat> {
    let across = to_parent_local(parent, ears.across()?).try_normalize()?;
    let horizontal = shortest_arc(calibration.horizontal, across);
    let vertical = local_arc(parent, calibration.head_forward, ears.center(), eyes.center())?;
    Some((horizontal * vertical).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular_distance;
    use std::f32::consts::FRAC_PI_4;

    fn upright() -> (Pair, Pair) {
        let shoulders = Pair::new(Vec3::new(0.2, 0.5, 0.0), Vec3::new(-0.2, 0.5, 0.0));
        let hips = Pair::new(Vec3::new(0.1, 0.0, 0.0), Vec3::new(-0.1, 0.0, 0.0));
        (shoulders, hips)
    }

    #[test]
    fn test_upright_torso_is_identity() {
        let (shoulders, hips) = upright();
        let q = upper_body_rotation(shoulders, hips).unwrap();
        assert!(angular_distance(q, Quat::IDENTITY) < 1e-4);

        let cal = CalibrationProfile::default();
        let q = lower_body_rotation(hips, &cal).unwrap();
        assert!(angular_distance(q, Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_leaning_torso() {
        let (shoulders, hips) = upright();
        let lean = Quat::from_rotation_z(FRAC_PI_4);
        let leaned = Pair::new(lean * shoulders.left, lean * shoulders.right);
        let q = upper_body_rotation(leaned, hips).unwrap();
        assert!(angular_distance(q, lean) < 1e-3);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_torso() {
        let p = Pair::new(Vec3::ZERO, Vec3::ZERO);
        assert!(upper_body_rotation(p, p).is_none());

        // Spine parallel to the shoulder line
        let shoulders = Pair::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        let hips = Pair::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0));
        assert!(upper_body_rotation(shoulders, hips).is_none());
    }

    #[test]
    fn test_hip_twist() {
        let cal = CalibrationProfile::default();
        let hips = Pair::new(Vec3::new(0.0, 0.0, -0.1), Vec3::new(0.0, 0.0, 0.1));
        let q = lower_body_rotation(hips, &cal).unwrap();
        assert!((q * Vec3::X).distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn test_neck_at_reference() {
        let cal = CalibrationProfile::default();
        let shoulders = Pair::new(Vec3::new(0.2, 0.0, 0.0), Vec3::new(-0.2, 0.0, 0.0));
        let ear_center = cal.neck * 0.3;
        let ears = Pair::new(ear_center + Vec3::X * 0.08, ear_center - Vec3::X * 0.08);
        let q = neck_rotation(Quat::IDENTITY, ears, shoulders, &cal).unwrap();
        assert!(angular_distance(q, Quat::IDENTITY) < 1e-4);

        // Same pose seen through a turned upper body
        let turn = Quat::from_rotation_y(0.6);
        let ears_t = Pair::new(turn * ears.left, turn * ears.right);
        let shoulders_t = Pair::new(turn * shoulders.left, turn * shoulders.right);
        let q = neck_rotation(turn, ears_t, shoulders_t, &cal).unwrap();
        assert!(angular_distance(q, Quat::IDENTITY) < 1e-3);
    }

    #[test]
    fn test_head_looking_forward() {
        let cal = CalibrationProfile::default();
        let ears = Pair::new(Vec3::new(0.08, 0.6, 0.0), Vec3::new(-0.08, 0.6, 0.0));
        let eyes = Pair::new(Vec3::new(0.03, 0.6, -0.1), Vec3::new(-0.03, 0.6, -0.1));
        let q = head_rotation(Quat::IDENTITY, ears, eyes, &cal).unwrap();
        assert!(angular_distance(q, Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_missing_pair() {
        assert!(Pair::from_options(Some(Vec3::X), None).is_none());
        assert!(Pair::from_options(Some(Vec3::X), Some(Vec3::Y)).is_some());
    }
}
