//! Synthetic performer
//!
//! Produces detector results for a body whose joint angles are known, so
//! the engine's output can be checked against the truth. The rest pose
//! matches the default calibration: every joint solves to identity when all
//! angles are zero.

use std::f32::consts::TAU;

use akira_core::{face, HandLandmark, HolisticResult, Landmark, PoseLandmark, Side};
use akira_retarget::CalibrationProfile;
use glam::{Quat, Vec3};

/// Visibility reported for every body landmark
pub const BODY_VISIBILITY: f32 = 0.95;

/// Ground-truth pose of the performer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerformerPose {
    /// Upper body turn about +Y (radians)
    pub torso_yaw: f32,
    /// Hip turn about +Y
    pub hip_yaw: f32,
    /// Arm raise in the frontal plane, 0 hanging
    pub left_arm_raise: f32,
    pub right_arm_raise: f32,
    /// Head turn about the neck's +Y
    pub head_yaw: f32,
    /// 0 open, 1 closed
    pub blink: f32,
    /// 0 closed, 1 wide open
    pub mouth_open: f32,
    /// Index to pinky curl about the bend axes
    pub finger_curl: f32,
    /// Horizontal offset in the image
    pub sway: f32,
}

/// How the performer moves over time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Choreography {
    /// Hold one pose
    Hold(PerformerPose),
    /// Slow periodic dance touching every channel
    Dance,
}

impl Choreography {
    pub fn pose_at(&self, t: f32) -> PerformerPose {
        match *self {
            Choreography::Hold(pose) => pose,
            Choreography::Dance => {
                let wave = |hz: f32, phase: f32| (TAU * hz * t + phase).sin();
                PerformerPose {
                    torso_yaw: 0.3 * wave(0.25, 0.0),
                    hip_yaw: 0.1 * wave(0.25, 0.5),
                    left_arm_raise: 0.6 + 0.5 * wave(0.5, 0.0),
                    right_arm_raise: 0.6 + 0.5 * wave(0.5, 1.0),
                    head_yaw: 0.25 * wave(0.2, 2.0),
                    // Eyes close for 0.2 s every 2 s
                    blink: if t.rem_euclid(2.0) < 0.2 { 1.0 } else { 0.0 },
                    mouth_open: 0.5 + 0.5 * wave(1.0, 0.0),
                    finger_curl: 0.6 + 0.4 * wave(0.3, 0.0),
                    sway: 0.1 * wave(0.1, 0.0),
                }
            }
        }
    }
}

/// Synthetic performer in front of a camera
#[derive(Debug, Clone)]
pub struct SyntheticPerformer {
    pub fps: f64,
    pub choreography: Choreography,
    pub left_hand: bool,
    pub right_hand: bool,
    pub face: bool,
    /// Include the ten iris points of the face mesh
    pub iris: bool,
    calibration: CalibrationProfile,
}

impl SyntheticPerformer {
    pub fn new(fps: f64, choreography: Choreography) -> Self {
        Self {
            fps,
            choreography,
            left_hand: true,
            right_hand: true,
            face: true,
            iris: true,
            calibration: CalibrationProfile::default(),
        }
    }

    /// Video time of frame `index`, in seconds
    pub fn time(&self, index: u64) -> f64 {
        index as f64 / self.fps
    }

    pub fn pose(&self, index: u64) -> PerformerPose {
        self.choreography.pose_at(self.time(index) as f32)
    }

    /// Detector result for frame `index`
    pub fn frame(&self, index: u64) -> HolisticResult {
        let pose = self.pose(index);
        let body = self.body_points(&pose);

        let to_landmarks = |points: &[Vec3]| -> Vec<Landmark> {
            points
                .iter()
                .map(|p| Landmark::new(p.x, -p.y, p.z).with_visibility(BODY_VISIBILITY))
                .collect()
        };
        let screen: Vec<Landmark> = body
            .iter()
            .map(|p| {
                Landmark::new(0.5 + pose.sway + p.x * 0.4, 0.6 - p.y * 0.4, 0.0)
                    .with_visibility(BODY_VISIBILITY)
            })
            .collect();

        let hand = |side: Side, visible: bool| {
            visible.then(|| vec![self.hand_points(side, &pose, &body)])
        };

        HolisticResult {
            pose_world_landmarks: Some(vec![to_landmarks(&body)]),
            pose_landmarks: Some(vec![screen]),
            left_hand_landmarks: hand(Side::Left, self.left_hand),
            right_hand_landmarks: hand(Side::Right, self.right_hand),
            face_landmarks: self.face.then(|| vec![self.face_mesh(&pose)]),
        }
    }

    /// Upper body world rotation implied by a pose
    pub fn upper_body(pose: &PerformerPose) -> Quat {
        Quat::from_rotation_y(pose.torso_yaw)
    }

    fn arm_swing(side: Side, raise: f32) -> Quat {
        Quat::from_rotation_z(side.sign() * raise)
    }

    /// World body points, +Y up, hip center at the origin
    fn body_points(&self, pose: &PerformerPose) -> Vec<Vec3> {
        let cal = &self.calibration;
        let torso = Self::upper_body(pose);
        let hips = Quat::from_rotation_y(pose.hip_yaw);
        let mut p = vec![Vec3::ZERO; PoseLandmark::COUNT];
        let mut set = |l: PoseLandmark, v: Vec3| p[l.index()] = v;

        // Trunk
        let shoulder_l = torso * Vec3::new(0.2, 0.5, 0.0);
        let shoulder_r = torso * Vec3::new(-0.2, 0.5, 0.0);
        set(PoseLandmark::LeftShoulder, shoulder_l);
        set(PoseLandmark::RightShoulder, shoulder_r);
        set(PoseLandmark::LeftHip, hips * Vec3::new(0.1, 0.0, 0.0));
        set(PoseLandmark::RightHip, hips * Vec3::new(-0.1, 0.0, 0.0));

        // Head
        let head = torso * Quat::from_rotation_y(pose.head_yaw);
        let ear_center = (shoulder_l + shoulder_r) * 0.5 + torso * cal.neck * 0.2;
        let eye_center = ear_center + head * cal.head_forward * 0.08;
        let across = head * Vec3::X;
        set(PoseLandmark::LeftEar, ear_center + across * 0.07);
        set(PoseLandmark::RightEar, ear_center - across * 0.07);
        set(PoseLandmark::LeftEye, eye_center + across * 0.03);
        set(PoseLandmark::RightEye, eye_center - across * 0.03);
        set(PoseLandmark::LeftEyeInner, eye_center + across * 0.02);
        set(PoseLandmark::LeftEyeOuter, eye_center + across * 0.04);
        set(PoseLandmark::RightEyeInner, eye_center - across * 0.02);
        set(PoseLandmark::RightEyeOuter, eye_center - across * 0.04);
        let nose = eye_center + head * Vec3::new(0.0, -0.03, -0.02);
        set(PoseLandmark::Nose, nose);
        set(PoseLandmark::MouthLeft, nose + across * 0.025 - Vec3::Y * 0.03);
        set(PoseLandmark::MouthRight, nose - across * 0.025 - Vec3::Y * 0.03);

        // Arms
        for (side, shoulder, raise) in [
            (Side::Left, shoulder_l, pose.left_arm_raise),
            (Side::Right, shoulder_r, pose.right_arm_raise),
        ] {
            let arm = cal.arm(side);
            let swing = torso * Self::arm_swing(side, raise);
            let elbow = shoulder + swing * arm.shoulder * 0.28;
            let wrist = elbow + swing * arm.elbow * 0.25;
            let tip = wrist + swing * arm.wrist * 0.08;
            let (e, w, pinky, index, thumb) = match side {
                Side::Left => (
                    PoseLandmark::LeftElbow,
                    PoseLandmark::LeftWrist,
                    PoseLandmark::LeftPinky,
                    PoseLandmark::LeftIndex,
                    PoseLandmark::LeftThumb,
                ),
                Side::Right => (
                    PoseLandmark::RightElbow,
                    PoseLandmark::RightWrist,
                    PoseLandmark::RightPinky,
                    PoseLandmark::RightIndex,
                    PoseLandmark::RightThumb,
                ),
            };
            set(e, elbow);
            set(w, wrist);
            set(pinky, tip);
            set(index, tip);
            set(thumb, tip);
        }

        // Legs
        for (side, hip) in [
            (Side::Left, hips * Vec3::new(0.1, 0.0, 0.0)),
            (Side::Right, hips * Vec3::new(-0.1, 0.0, 0.0)),
        ] {
            let knee = hip + hips * cal.hip * 0.42;
            let ankle = knee + hips * cal.hip * 0.4;
            let heel = ankle + Vec3::new(0.0, -0.05, 0.03);
            let toe = ankle + Vec3::new(0.0, -0.06, -0.12);
            let (k, a, h, f) = match side {
                Side::Left => (
                    PoseLandmark::LeftKnee,
                    PoseLandmark::LeftAnkle,
                    PoseLandmark::LeftHeel,
                    PoseLandmark::LeftFootIndex,
                ),
                Side::Right => (
                    PoseLandmark::RightKnee,
                    PoseLandmark::RightAnkle,
                    PoseLandmark::RightHeel,
                    PoseLandmark::RightFootIndex,
                ),
            };
            set(k, knee);
            set(a, ankle);
            set(h, heel);
            set(f, toe);
        }

        p
    }

    /// Hand landmarks (stored y-down like the detector)
    fn hand_points(&self, side: Side, pose: &PerformerPose, body: &[Vec3]) -> Vec<Landmark> {
        let cal = &self.calibration;
        let raise = match side {
            Side::Left => pose.left_arm_raise,
            Side::Right => pose.right_arm_raise,
        };
        let hand = Self::upper_body(pose) * Self::arm_swing(side, raise);
        let wrist_landmark = match side {
            Side::Left => PoseLandmark::LeftWrist,
            Side::Right => PoseLandmark::RightWrist,
        };
        let wrist = body[wrist_landmark.index()];
        let forward = cal.arm(side).wrist;
        let across = cal.hand_across;
        let fingers = cal.fingers(side);

        let mut p = vec![wrist; HandLandmark::COUNT];
        let mut set = |l: HandLandmark, v: Vec3| p[l.index()] = v;

        let middle = wrist + hand * forward * 0.08;
        let knuckles = [
            (HandLandmark::IndexMcp, HandLandmark::IndexPip, 0.02, fingers.index, cal.bend_axes.index),
            (HandLandmark::MiddleMcp, HandLandmark::MiddlePip, 0.0, fingers.middle, cal.bend_axes.middle),
            (HandLandmark::RingMcp, HandLandmark::RingPip, -0.02, fingers.ring, cal.bend_axes.ring),
            (HandLandmark::PinkyMcp, HandLandmark::PinkyPip, -0.04, fingers.pinky, cal.bend_axes.pinky),
        ];
        for (mcp, pip, offset, reference, axis) in knuckles {
            let base = middle + hand * across * offset;
            let curl = Quat::from_axis_angle(axis, pose.finger_curl);
            set(mcp, base);
            set(pip, base + hand * curl * reference * 0.03);
        }
        set(HandLandmark::ThumbCmc, wrist + hand * fingers.thumb * 0.02);
        set(HandLandmark::ThumbMcp, wrist + hand * fingers.thumb * 0.04);
        set(HandLandmark::ThumbIp, wrist + hand * fingers.thumb * 0.07);
        set(HandLandmark::ThumbTip, wrist + hand * fingers.thumb * 0.09);

        p.into_iter()
            .map(|v| Landmark::new(v.x, -v.y, v.z))
            .collect()
    }

    /// Face mesh in image space (y down)
    fn face_mesh(&self, pose: &PerformerPose) -> Vec<Landmark> {
        let count = if self.iris {
            face::MESH_WITH_IRIS_COUNT
        } else {
            face::MESH_COUNT
        };
        let mut mesh = vec![Landmark::new(0.5, 0.5, 0.0); count];
        let mut set = |i: usize, x: f32, y: f32| mesh[i] = Landmark::new(x, y, 0.0);

        set(face::LEFT_CHEEK, 0.3, 0.5);
        set(face::RIGHT_CHEEK, 0.7, 0.5);
        set(face::LEFT_EYE_WIDTH_REF, 0.35, 0.4);
        set(face::RIGHT_EYE_WIDTH_REF, 0.65, 0.4);

        let lid = 0.015 * (1.0 - pose.blink.clamp(0.0, 1.0));
        set(face::LEFT_EYE_UPPER, 0.4, 0.4 - lid);
        set(face::LEFT_EYE_LOWER, 0.4, 0.4 + lid);
        set(face::RIGHT_EYE_UPPER, 0.6, 0.4 - lid);
        set(face::RIGHT_EYE_LOWER, 0.6, 0.4 + lid);
        set(face::LEFT_EYE_OUTER, 0.37, 0.4);
        set(face::LEFT_EYE_INNER, 0.43, 0.4);
        set(face::RIGHT_EYE_INNER, 0.57, 0.4);
        set(face::RIGHT_EYE_OUTER, 0.63, 0.4);

        let open = 0.008 + 0.04 * pose.mouth_open.clamp(0.0, 1.0);
        set(face::UPPER_LIP_TOP, 0.5, 0.6);
        set(face::LOWER_LIP_BOTTOM, 0.5, 0.6 + open);
        set(face::UPPER_LIP_CENTER, 0.5, 0.603);
        set(face::LOWER_LIP_CENTER, 0.5, 0.597 + open);
        set(face::MOUTH_LEFT, 0.444, 0.6 + open * 0.5);
        set(face::MOUTH_RIGHT, 0.556, 0.6 + open * 0.5);

        set(face::LEFT_BROW_INNER, 0.45, 0.5);
        set(face::RIGHT_BROW_INNER, 0.55, 0.5);
        set(face::LEFT_BROW_OUTER, 0.38, 0.5);
        set(face::RIGHT_BROW_OUTER, 0.62, 0.5);

        if self.iris {
            set(face::LEFT_IRIS, 0.4, 0.4);
            set(face::RIGHT_IRIS, 0.6, 0.4);
        }
        mesh
    }
}
