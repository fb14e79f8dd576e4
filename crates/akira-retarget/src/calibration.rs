//! Calibration profile - rest-pose reference directions of the target rig
//!
//! Every solver measures a live direction against one of these. They describe
//! the model standing in its bind pose (arms down at roughly 37 degrees), in
//! the parent bone's local frame, with +Y up, +X toward the model's left and
//! -Z toward the camera.

use akira_core::{AkiraError, AkiraResult, Finger, Side};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Rest directions of one arm chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmReference {
    /// Shoulder to elbow, in upper body space
    pub shoulder: Vec3,
    /// Elbow to wrist, in shoulder space
    pub elbow: Vec3,
    /// Wrist to middle knuckle, in wrist-twist space
    pub wrist: Vec3,
}

/// Rest directions of the proximal finger segments of one hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerReference {
    pub thumb: Vec3,
    pub index: Vec3,
    pub middle: Vec3,
    pub ring: Vec3,
    pub pinky: Vec3,
}

impl FingerReference {
    pub fn get(&self, finger: Finger) -> Vec3 {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }
}

/// Axes the distal finger joints curl about
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BendAxes {
    pub thumb_left: Vec3,
    pub thumb_right: Vec3,
    pub index: Vec3,
    pub middle: Vec3,
    pub ring: Vec3,
    pub pinky: Vec3,
}

/// Reference vectors for every solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationProfile {
    /// Shoulder center to ear center, in upper body space
    pub neck: Vec3,
    /// Right to left (hips, ears)
    pub horizontal: Vec3,
    /// Ear center to eye center, in neck space
    pub head_forward: Vec3,
    /// Ring knuckle to index knuckle, in elbow space
    pub hand_across: Vec3,
    /// Hip to knee, in lower body space
    pub hip: Vec3,
    /// Forward direction the foot yaw is measured from
    pub foot_forward: Vec3,
    pub left_arm: ArmReference,
    pub right_arm: ArmReference,
    pub left_fingers: FingerReference,
    pub right_fingers: FingerReference,
    pub bend_axes: BendAxes,
}

fn n(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z).normalize()
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        let left_wrist = n(0.72573996, -0.40247154, -0.01692206);
        let right_wrist = n(-0.72573996, -0.40247154, 0.01692206);

        Self {
            neck: n(0.0, 0.975_857_8, -0.218_406_77),
            horizontal: Vec3::X,
            head_forward: Vec3::NEG_Z,
            hand_across: Vec3::NEG_Z,
            hip: n(-0.009_540_689, -0.998_440_86, 0.054_998_49),
            foot_forward: Vec3::Z,
            left_arm: ArmReference {
                shoulder: n(0.801_251_5, -0.596_637_9, -0.044_936_57),
                elbow: n(0.799_121_45, -0.600_241_3, -0.033_395_525),
                wrist: left_wrist,
            },
            right_arm: ArmReference {
                shoulder: n(-0.802_037_6, -0.597_223_2, -0.007_749_548),
                elbow: n(-0.799_121_3, -0.600_241_5, -0.033_395_53),
                wrist: right_wrist,
            },
            left_fingers: FingerReference {
                thumb: n(0.5, -0.5, -0.7),
                index: left_wrist,
                middle: left_wrist,
                ring: left_wrist,
                pinky: left_wrist,
            },
            right_fingers: FingerReference {
                thumb: n(-0.5, -0.5, -0.7),
                index: right_wrist,
                middle: right_wrist,
                ring: right_wrist,
                pinky: right_wrist,
            },
            bend_axes: BendAxes {
                thumb_left: n(-1.0, -1.0, 0.0),
                thumb_right: n(-1.0, 1.0, 0.0),
                index: n(-0.031, 0.0, -0.993),
                middle: n(0.03, 0.0, 0.996),
                ring: n(0.06, 0.0, 0.996),
                pinky: n(0.088, 0.0, 0.997),
            },
        }
    }
}

impl CalibrationProfile {
    pub fn arm(&self, side: Side) -> &ArmReference {
        match side {
            Side::Left => &self.left_arm,
            Side::Right => &self.right_arm,
        }
    }

    pub fn fingers(&self, side: Side) -> &FingerReference {
        match side {
            Side::Left => &self.left_fingers,
            Side::Right => &self.right_fingers,
        }
    }

    pub fn bend_axis(&self, side: Side, finger: Finger) -> Vec3 {
        let axes = &self.bend_axes;
        match (finger, side) {
            (Finger::Thumb, Side::Left) => axes.thumb_left,
            (Finger::Thumb, Side::Right) => axes.thumb_right,
            (Finger::Index, _) => axes.index,
            (Finger::Middle, _) => axes.middle,
            (Finger::Ring, _) => axes.ring,
            (Finger::Pinky, _) => axes.pinky,
        }
    }

    fn vectors(&self) -> Vec<(&'static str, Vec3)> {
        let mut out = vec![
            ("neck", self.neck),
            ("horizontal", self.horizontal),
            ("head_forward", self.head_forward),
            ("hand_across", self.hand_across),
            ("hip", self.hip),
            ("foot_forward", self.foot_forward),
            ("bend_axes.thumb_left", self.bend_axes.thumb_left),
            ("bend_axes.thumb_right", self.bend_axes.thumb_right),
            ("bend_axes.index", self.bend_axes.index),
            ("bend_axes.middle", self.bend_axes.middle),
            ("bend_axes.ring", self.bend_axes.ring),
            ("bend_axes.pinky", self.bend_axes.pinky),
        ];
        for side in Side::BOTH {
            let arm = self.arm(side);
            out.push(("arm.shoulder", arm.shoulder));
            out.push(("arm.elbow", arm.elbow));
            out.push(("arm.wrist", arm.wrist));
            for finger in Finger::ALL {
                out.push(("fingers", self.fingers(side).get(finger)));
            }
        }
        out
    }

    /// Rescale every vector to unit length
    ///
    /// Hand-edited profiles rarely carry exact unit vectors.
    pub fn normalized(mut self) -> AkiraResult<Self> {
        self.validate()?;
        let unit = |v: &mut Vec3| *v = v.normalize();
        unit(&mut self.neck);
        unit(&mut self.horizontal);
        unit(&mut self.head_forward);
        unit(&mut self.hand_across);
        unit(&mut self.hip);
        unit(&mut self.foot_forward);
        for arm in [&mut self.left_arm, &mut self.right_arm] {
            unit(&mut arm.shoulder);
            unit(&mut arm.elbow);
            unit(&mut arm.wrist);
        }
        for fingers in [&mut self.left_fingers, &mut self.right_fingers] {
            unit(&mut fingers.thumb);
            unit(&mut fingers.index);
            unit(&mut fingers.middle);
            unit(&mut fingers.ring);
            unit(&mut fingers.pinky);
        }
        let axes = &mut self.bend_axes;
        unit(&mut axes.thumb_left);
        unit(&mut axes.thumb_right);
        unit(&mut axes.index);
        unit(&mut axes.middle);
        unit(&mut axes.ring);
        unit(&mut axes.pinky);
        Ok(self)
    }

    /// Every vector must be finite and non-zero
    pub fn validate(&self) -> AkiraResult<()> {
        for (name, v) in self.vectors() {
            if !v.is_finite() || v.length_squared() < 1e-12 {
                return Err(AkiraError::InvalidConfig(format!(
                    "calibration vector {} is degenerate: {:?}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unit() {
        let profile = CalibrationProfile::default();
        assert!(profile.validate().is_ok());
        for (_, v) in profile.vectors() {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sides_mirror() {
        let profile = CalibrationProfile::default();
        assert!(profile.arm(Side::Left).shoulder.x > 0.0);
        assert!(profile.arm(Side::Right).shoulder.x < 0.0);
        assert_eq!(
            profile.fingers(Side::Left).thumb.x,
            -profile.fingers(Side::Right).thumb.x
        );
        assert_ne!(
            profile.bend_axis(Side::Left, Finger::Thumb),
            profile.bend_axis(Side::Right, Finger::Thumb)
        );
        assert_eq!(
            profile.bend_axis(Side::Left, Finger::Ring),
            profile.bend_axis(Side::Right, Finger::Ring)
        );
    }

    #[test]
    fn test_normalized_rejects_zero_vector() {
        let mut profile = CalibrationProfile::default();
        profile.hip = Vec3::ZERO;
        assert!(matches!(
            profile.normalized(),
            Err(AkiraError::InvalidConfig(_))
        ));

        let mut profile = CalibrationProfile::default();
        profile.neck = Vec3::new(0.0, 3.0, 0.0);
        let profile = profile.normalized().unwrap();
        assert!(profile.neck.distance(Vec3::Y) < 1e-6);
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let json = r#"{ "foot_forward": [0.0, 0.0, -1.0] }"#;
        let profile: CalibrationProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.foot_forward, Vec3::NEG_Z);
        assert_eq!(profile.hip, CalibrationProfile::default().hip);
    }
}
