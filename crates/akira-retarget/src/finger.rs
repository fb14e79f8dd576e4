//! Finger solver
//!
//! The detector sees each finger's first segment well and the rest poorly.
//! Only the proximal joint is measured; the distal joints are coupled to it
//! by bending about the finger's curl axis by a fixed fraction of the
//! proximal bend.

use akira_core::{Finger, HandLandmark, Landmark, Side, FINGER_JOINTS_PER_HAND};
use glam::{Quat, Vec3};

use crate::math::local_arc;
use crate::{CalibrationProfile, FingerConfig};

/// Landmarks spanning the measured segment of each finger
fn proximal_segment(finger: Finger) -> (HandLandmark, HandLandmark) {
    match finger {
        Finger::Thumb => (HandLandmark::ThumbMcp, HandLandmark::ThumbIp),
        Finger::Index => (HandLandmark::IndexMcp, HandLandmark::IndexPip),
        Finger::Middle => (HandLandmark::MiddleMcp, HandLandmark::MiddlePip),
        Finger::Ring => (HandLandmark::RingMcp, HandLandmark::RingPip),
        Finger::Pinky => (HandLandmark::PinkyMcp, HandLandmark::PinkyPip),
    }
}

/// Signed bend of `q` about `axis`, in degrees
///
/// The magnitude is the full rotation angle of `q`; the sign says which way
/// it curls relative to the axis.
pub fn bend_degrees(q: Quat, axis: Vec3) -> f32 {
    let total = 2.0 * q.w.abs().min(1.0).acos().to_degrees();
    let along = q.x * axis.x + q.y * axis.y + q.z * axis.z;
    if along < 0.0 {
        -total
    } else {
        total
    }
}

/// Distal joint coupled to a proximal rotation
pub fn coupled_joint(proximal: Quat, axis: Vec3, ratio: f32) -> Quat {
    let degrees = bend_degrees(proximal, axis) * ratio;
    Quat::from_axis_angle(axis, degrees.to_radians())
}

/// All 14 finger joints of one hand, in [`akira_core::Bone::fingers`] order
///
/// `hand_space` is the world rotation of the hand bone. Hand landmarks are
/// read with +Y up. A finger whose segment is missing has an identity
/// proximal joint, and so identity distal joints.
pub fn calculate_finger_rotation(
    side: Side,
    hand_space: Quat,
    hand: &[Landmark],
    calibration: &CalibrationProfile,
    config: &FingerConfig,
) -> [Quat; FINGER_JOINTS_PER_HAND] {
    let mut out = [Quat::IDENTITY; FINGER_JOINTS_PER_HAND];
    let references = calibration.fingers(side);
    let point = |l: HandLandmark| hand.get(l.index()).map(Landmark::to_vec3_y_up);

    let mut slot = 0;
    for finger in Finger::ALL {
        let (base, tip) = proximal_segment(finger);
        let proximal = match (point(base), point(tip)) {
            (Some(from), Some(to)) => local_arc(hand_space, references.get(finger), from, to)
                .unwrap_or(Quat::IDENTITY),
            _ => Quat::IDENTITY,
        };
        out[slot] = proximal;

        let axis = calibration.bend_axis(side, finger);
        for (i, ratio) in config.ratios(finger).iter().enumerate() {
            out[slot + 1 + i] = coupled_joint(proximal, axis, *ratio);
        }
        slot += finger.joint_count();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular_distance;
    use akira_core::Bone;

    fn open_hand(side: Side, cal: &CalibrationProfile) -> Vec<Landmark> {
        let refs = cal.fingers(side);
        let mut hand = vec![Landmark::default(); HandLandmark::COUNT];
        let mut put = |l: HandLandmark, v: Vec3| {
            // stored y-down like the detector
            hand[l.index()] = Landmark::new(v.x, -v.y, v.z);
        };
        for finger in Finger::ALL {
            let (base, tip) = proximal_segment(finger);
            let origin = Vec3::new(0.0, 0.0, finger as u8 as f32 * 0.01);
            put(base, origin);
            put(tip, origin + refs.get(finger) * 0.03);
        }
        hand
    }

    #[test]
    fn test_missing_hand_gives_identity_joints() {
        let cal = CalibrationProfile::default();
        let joints = calculate_finger_rotation(
            Side::Left,
            Quat::from_rotation_z(0.3),
            &[],
            &cal,
            &FingerConfig::default(),
        );
        assert_eq!(joints.len(), 14);
        assert_eq!(Bone::fingers(Side::Left).len(), joints.len());
        for q in joints {
            assert!(angular_distance(q, Quat::IDENTITY) < 1e-6);
        }
    }

    #[test]
    fn test_open_hand_is_rest() {
        let cal = CalibrationProfile::default();
        for side in Side::BOTH {
            let hand = open_hand(side, &cal);
            let joints = calculate_finger_rotation(
                side,
                Quat::IDENTITY,
                &hand,
                &cal,
                &FingerConfig::default(),
            );
            for q in joints {
                assert!(angular_distance(q, Quat::IDENTITY) < 1e-3);
            }
        }
    }

    #[test]
    fn test_bend_degrees_sign() {
        let axis = Vec3::Z;
        let q = Quat::from_axis_angle(axis, 30f32.to_radians());
        assert!((bend_degrees(q, axis) - 30.0).abs() < 1e-3);
        assert!((bend_degrees(q.inverse(), axis) + 30.0).abs() < 1e-3);
        assert_eq!(bend_degrees(Quat::IDENTITY, axis), 0.0);
    }

    #[test]
    fn test_coupling_ratio() {
        let axis = Vec3::new(0.03, 0.0, 0.996).normalize();
        let proximal = Quat::from_axis_angle(axis, 40f32.to_radians());
        let middle = coupled_joint(proximal, axis, 0.9);
        let distal = coupled_joint(proximal, axis, 0.65);
        assert!((angular_distance(Quat::IDENTITY, middle).to_degrees() - 36.0).abs() < 0.05);
        assert!((angular_distance(Quat::IDENTITY, distal).to_degrees() - 26.0).abs() < 0.05);
    }

    #[test]
    fn test_curled_index_drives_distal_joints() {
        let cal = CalibrationProfile::default();
        let mut hand = open_hand(Side::Right, &cal);
        let (base, tip) = proximal_segment(Finger::Index);
        let b = hand[base.index()].to_vec3_y_up();
        let curl = Quat::from_axis_angle(cal.bend_axes.index, 0.8);
        let t = b + curl * cal.right_fingers.index * 0.03;
        hand[tip.index()] = Landmark::new(t.x, -t.y, t.z);

        let joints =
            calculate_finger_rotation(Side::Right, Quat::IDENTITY, &hand, &cal, &FingerConfig::default());
        let idx = |j| {
            Bone::fingers(Side::Right)
                .iter()
                .position(|b| Some(*b) == Bone::finger(Side::Right, Finger::Index, j))
                .unwrap()
        };
        let proximal = angular_distance(Quat::IDENTITY, joints[idx(0)]);
        let middle = angular_distance(Quat::IDENTITY, joints[idx(1)]);
        let distal = angular_distance(Quat::IDENTITY, joints[idx(2)]);
        assert!(proximal > 0.1);
        assert!(middle > distal && distal > 0.0);
        // Other fingers untouched
        assert!(angular_distance(Quat::IDENTITY, joints[idx(0) + 3]) < 1e-3);
    }
}
