//! Retargeting engine
//!
//! One engine per bound model. It owns the skeleton state and every
//! persistent filter; each `update` completes before the next.

use akira_core::{
    AkiraError, AkiraResult, Bone, FrameTime, HandLandmark, HolisticFrame, Morph, PoseFrame,
    PoseLandmark, Side, Space,
};
use glam::Quat;
use tracing::{debug, trace};

use crate::body::{head_rotation, lower_body_rotation, neck_rotation, upper_body_rotation, Pair};
use crate::face::{eye_gaze, ExpressionSolver};
use crate::translation::{foot_ik_target, root_target};
use crate::{
    arm_rotations, calculate_finger_rotation, leg_rotations, ArmPoints, ArmRotations,
    CalibrationProfile, EngineConfig, FilterBank, HandPoints, LegPoints, Signal, Skeleton,
};

/// Shoulder, elbow, wrist and hip landmarks of one side
fn side_points(side: Side) -> (PoseLandmark, PoseLandmark, PoseLandmark, PoseLandmark) {
    match side {
        Side::Left => (
            PoseLandmark::LeftShoulder,
            PoseLandmark::LeftElbow,
            PoseLandmark::LeftWrist,
            PoseLandmark::LeftHip,
        ),
        Side::Right => (
            PoseLandmark::RightShoulder,
            PoseLandmark::RightElbow,
            PoseLandmark::RightWrist,
            PoseLandmark::RightHip,
        ),
    }
}

fn leg_landmarks(side: Side) -> (PoseLandmark, PoseLandmark, PoseLandmark) {
    match side {
        Side::Left => (
            PoseLandmark::LeftHip,
            PoseLandmark::LeftKnee,
            PoseLandmark::LeftAnkle,
        ),
        Side::Right => (
            PoseLandmark::RightHip,
            PoseLandmark::RightKnee,
            PoseLandmark::RightAnkle,
        ),
    }
}

/// Landmark stream to skeleton pose
#[derive(Debug, Clone)]
pub struct RetargetEngine {
    config: EngineConfig,
    calibration: CalibrationProfile,
    skeleton: Skeleton,
    filters: FilterBank,
    expression: ExpressionSolver,
    last_time: Option<FrameTime>,
    frames: u64,
}

impl RetargetEngine {
    /// Create an engine for a bound skeleton
    ///
    /// Fails when the configuration or calibration is invalid.
    pub fn new(
        config: EngineConfig,
        calibration: CalibrationProfile,
        skeleton: Skeleton,
    ) -> AkiraResult<Self> {
        config.validate()?;
        let calibration = calibration.normalized()?;
        let filters = FilterBank::new(&config.filters)?;
        let expression = ExpressionSolver::new(config.expression);

        Ok(Self {
            config,
            calibration,
            skeleton,
            filters,
            expression,
            last_time: None,
            frames: 0,
        })
    }

    /// Engine with default tuning driving every known bone and morph
    pub fn with_defaults() -> AkiraResult<Self> {
        Self::new(
            EngineConfig::default(),
            CalibrationProfile::default(),
            Skeleton::full(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationProfile {
        &self.calibration
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Frames processed since creation or the last reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Process one detector frame taken at `time`
    ///
    /// Timestamps must be strictly increasing. A rejected frame leaves the
    /// engine untouched.
    pub fn update(&mut self, frame: &HolisticFrame, time: FrameTime) -> AkiraResult<PoseFrame> {
        if let Some(previous) = self.last_time {
            if time <= previous {
                return Err(AkiraError::NonMonotonicTime {
                    previous,
                    current: time,
                });
            }
        }
        frame.validate()?;
        self.last_time = Some(time);
        self.frames += 1;

        let t = time.as_secs_f64();
        let lerp = self.config.lerp_factor;

        if frame.body.is_empty() {
            debug!(?time, "no body landmarks");
        }

        // 1. Torso
        let torso_shoulders = self.pair(frame, t, Signal::TorsoShoulder, |s| side_points(s).0);
        let torso_hips = self.pair(frame, t, Signal::TorsoHip, |s| side_points(s).3);

        let upper_body = match (torso_shoulders, torso_hips) {
            (Some(shoulders), Some(hips)) => upper_body_rotation(shoulders, hips),
            _ => None,
        }
        .unwrap_or(Quat::IDENTITY);
        let lower_body = torso_hips
            .and_then(|hips| lower_body_rotation(hips, &self.calibration))
            .unwrap_or(Quat::IDENTITY);

        // 2. Neck and head
        let raw = |l: PoseLandmark| frame.body_point(l).map(|p| p.to_vec3_y_up());
        let ears = Pair::from_options(raw(PoseLandmark::LeftEar), raw(PoseLandmark::RightEar));
        let eyes = Pair::from_options(raw(PoseLandmark::LeftEye), raw(PoseLandmark::RightEye));
        let shoulders = Pair::from_options(
            raw(PoseLandmark::LeftShoulder),
            raw(PoseLandmark::RightShoulder),
        );

        let neck = match (ears, shoulders) {
            (Some(ears), Some(shoulders)) => {
                neck_rotation(upper_body, ears, shoulders, &self.calibration)
            }
            _ => None,
        }
        .unwrap_or(Quat::IDENTITY);
        let head = match (ears, eyes) {
            (Some(ears), Some(eyes)) => {
                head_rotation(upper_body * neck, ears, eyes, &self.calibration)
            }
            _ => None,
        };

        // 3. Arms
        let mut arms = [ArmRotations::default(); 2];
        for (i, side) in Side::BOTH.into_iter().enumerate() {
            let (shoulder, elbow, wrist, _) = side_points(side);
            let points = ArmPoints {
                shoulder: self
                    .filters
                    .sample(Signal::ArmShoulder(side), t, frame.body_point(shoulder)),
                elbow: self
                    .filters
                    .sample(Signal::ArmElbow(side), t, frame.body_point(elbow)),
                wrist: self
                    .filters
                    .sample(Signal::ArmWrist(side), t, frame.body_point(wrist)),
            };
            let hand_point =
                |l: HandLandmark| frame.hand_point(side, l).map(|p| p.to_vec3_y_up());
            let hand = HandPoints {
                wrist: hand_point(HandLandmark::Wrist),
                index_mcp: hand_point(HandLandmark::IndexMcp),
                middle_mcp: hand_point(HandLandmark::MiddleMcp),
                ring_mcp: hand_point(HandLandmark::RingMcp),
            };
            arms[i] = arm_rotations(side, upper_body, &points, &hand, &self.calibration);
        }

        // 4. Legs
        let mut legs = Vec::with_capacity(2);
        let mut ankles = [None; 2];
        for (i, side) in Side::BOTH.into_iter().enumerate() {
            let (hip, knee, ankle) = leg_landmarks(side);
            let points = LegPoints {
                hip: self
                    .filters
                    .sample(Signal::LegHip(side), t, frame.body_point(hip)),
                knee: self
                    .filters
                    .sample(Signal::LegKnee(side), t, frame.body_point(knee)),
                ankle: self
                    .filters
                    .sample(Signal::LegAnkle(side), t, frame.body_point(ankle)),
            };
            ankles[i] = points.ankle;
            legs.push(leg_rotations(
                lower_body,
                &points,
                &self.calibration,
                &self.config.limits,
            ));
        }

        // 5. Fingers
        for (i, side) in Side::BOTH.into_iter().enumerate() {
            let hand = frame.hand(side);
            if hand.is_empty() {
                debug!(?side, "no hand landmarks");
            }
            let joints = calculate_finger_rotation(
                side,
                arms[i].hand_space(upper_body),
                hand,
                &self.calibration,
                &self.config.fingers,
            );
            for (bone, q) in Bone::fingers(side).iter().zip(joints) {
                self.skeleton.set_rotation(*bone, q, Space::Local, lerp);
            }
        }

        // 6. Root translation
        let screen_hips = self.screen_pair(frame, t, Signal::ScreenHip, |s| side_points(s).3);
        let screen_shoulders =
            self.screen_pair(frame, t, Signal::ScreenShoulder, |s| side_points(s).0);
        if let (Some(hips), Some(shoulders)) = (screen_hips, screen_shoulders) {
            let target = root_target(hips, shoulders, &self.config.root);
            self.skeleton
                .lerp_position(Bone::Root, target, self.config.root_smoothing());
        }

        // Trunk and limb writes
        self.skeleton
            .set_rotation(Bone::UpperBody, upper_body, Space::Local, lerp);
        self.skeleton.set_rotation(Bone::Neck, neck, Space::Local, lerp);
        self.skeleton
            .set_rotation(Bone::LowerBody, lower_body, Space::Local, lerp);

        for (i, side) in Side::BOTH.into_iter().enumerate() {
            let arm = &arms[i];
            self.skeleton
                .set_rotation(Bone::shoulder(side), arm.shoulder, Space::Local, lerp);
            self.skeleton
                .set_rotation(Bone::elbow(side), arm.elbow, Space::Local, lerp);
            self.skeleton
                .set_rotation(Bone::wrist_twist(side), arm.wrist_twist, Space::Local, lerp);
            self.skeleton
                .set_rotation(Bone::wrist(side), arm.wrist, Space::Local, lerp);

            let leg = &legs[i];
            self.skeleton
                .set_rotation(Bone::hip(side), leg.hip, Space::Local, lerp);
            self.skeleton
                .set_rotation(Bone::ankle(side), leg.ankle, Space::World, lerp);

            // 7. Foot IK
            if let Some(ankle) = ankles[i] {
                let target = foot_ik_target(ankle, &self.config.foot_ik);
                self.skeleton.lerp_position(Bone::foot_ik(side), target, lerp);
            }
        }

        if let Some(head) = head {
            self.skeleton.set_rotation(Bone::Head, head, Space::Local, lerp);
        }

        // 8. Expressions
        match self.expression.solve(&frame.face) {
            Some(targets) => {
                for (morph, weight) in targets.weights {
                    self.skeleton.lerp_morph(morph, weight, lerp);
                }
            }
            None => debug!("no face landmarks"),
        }

        // 9. Gaze
        if self.config.eye_gaze.enabled {
            if let Some((left, right)) = eye_gaze(&frame.face, &self.config.eye_gaze) {
                self.skeleton
                    .set_rotation(Bone::LeftEye, left, Space::Local, lerp);
                self.skeleton
                    .set_rotation(Bone::RightEye, right, Space::Local, lerp);
            }
        }

        trace!(
            frame = self.frames,
            ?time,
            blink = ?self.skeleton.morph_weight(Morph::Blink),
            "frame retargeted"
        );
        Ok(self.skeleton.snapshot())
    }

    /// Filtered world-space pair for a per-side signal
    fn pair(
        &mut self,
        frame: &HolisticFrame,
        t: f64,
        signal: fn(Side) -> Signal,
        landmark: fn(Side) -> PoseLandmark,
    ) -> Option<Pair> {
        let left = self.filters.sample(
            signal(Side::Left),
            t,
            frame.body_point(landmark(Side::Left)),
        );
        let right = self.filters.sample(
            signal(Side::Right),
            t,
            frame.body_point(landmark(Side::Right)),
        );
        Pair::from_options(left, right)
    }

    /// Filtered image-space pair for a per-side signal
    fn screen_pair(
        &mut self,
        frame: &HolisticFrame,
        t: f64,
        signal: fn(Side) -> Signal,
        landmark: fn(Side) -> PoseLandmark,
    ) -> Option<Pair> {
        let left = self.filters.sample(
            signal(Side::Left),
            t,
            frame.screen_point(landmark(Side::Left)),
        );
        let right = self.filters.sample(
            signal(Side::Right),
            t,
            frame.screen_point(landmark(Side::Right)),
        );
        Pair::from_options(left, right)
    }

    /// Reset every filter, the skeleton and the clock
    pub fn reset(&mut self) {
        self.filters.reset();
        self.expression.reset();
        self.skeleton.reset();
        self.last_time = None;
        self.frames = 0;
        debug!("engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular_distance;
    use akira_core::Landmark;
    use glam::Vec3;

    fn t(ms: i64) -> FrameTime {
        FrameTime::from_millis(ms)
    }

    #[test]
    fn test_empty_frame_keeps_rest_pose() {
        let mut engine = RetargetEngine::with_defaults().unwrap();
        let pose = engine.update(&HolisticFrame::empty(), t(0)).unwrap();

        assert_eq!(pose.bones.len(), Bone::COUNT);
        assert_eq!(pose.morphs.len(), Morph::COUNT);
        for bone in &pose.bones {
            assert!(angular_distance(bone.rotation, Quat::IDENTITY) < 1e-6);
            assert_eq!(bone.position, Vec3::ZERO);
        }
        for finger in Bone::fingers(Side::Left) {
            assert_eq!(pose.rotation(*finger), Quat::IDENTITY);
        }
    }

    #[test]
    fn test_non_monotonic_time_rejected() {
        let mut engine = RetargetEngine::with_defaults().unwrap();
        engine.update(&HolisticFrame::empty(), t(100)).unwrap();
        let err = engine.update(&HolisticFrame::empty(), t(100)).unwrap_err();
        assert!(matches!(err, AkiraError::NonMonotonicTime { .. }));
        assert!(err.is_frame_local());
        assert_eq!(engine.frames(), 1);
        assert!(engine.update(&HolisticFrame::empty(), t(133)).is_ok());
    }

    #[test]
    fn test_invalid_landmark_rejected() {
        let mut engine = RetargetEngine::with_defaults().unwrap();
        let frame = HolisticFrame {
            body: vec![Landmark::new(f32::NAN, 0.0, 0.0); PoseLandmark::COUNT],
            ..Default::default()
        };
        assert!(matches!(
            engine.update(&frame, t(0)),
            Err(AkiraError::InvalidLandmark { .. })
        ));
        assert_eq!(engine.frames(), 0);
    }

    #[test]
    fn test_rotations_stay_unit() {
        let mut engine = RetargetEngine::with_defaults().unwrap();
        let mut body = vec![Landmark::new(0.0, 0.0, 0.0).with_visibility(0.99); PoseLandmark::COUNT];
        for (i, l) in body.iter_mut().enumerate() {
            let f = i as f32;
            l.x = (f * 0.37).sin() * 0.3;
            l.y = (f * 0.11).cos() * 0.5;
            l.z = (f * 0.23).sin() * 0.1;
        }
        let frame = HolisticFrame {
            body,
            ..Default::default()
        };

        for i in 0..10 {
            let pose = engine.update(&frame, t(i * 33)).unwrap();
            for bone in &pose.bones {
                assert!(
                    (bone.rotation.length() - 1.0).abs() < 1e-5,
                    "{} not unit",
                    bone.bone
                );
            }
        }
    }

    #[test]
    fn test_partial_skeleton() {
        let skeleton = Skeleton::new([Bone::Root, Bone::Head], [Morph::Blink]);
        let mut engine =
            RetargetEngine::new(EngineConfig::default(), CalibrationProfile::default(), skeleton)
                .unwrap();
        let pose = engine.update(&HolisticFrame::empty(), t(0)).unwrap();
        assert_eq!(pose.bones.len(), 2);
        assert_eq!(pose.morphs.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.lerp_factor = 2.0;
        assert!(RetargetEngine::new(config, CalibrationProfile::default(), Skeleton::full()).is_err());
    }

    #[test]
    fn test_reset() {
        let mut engine = RetargetEngine::with_defaults().unwrap();
        engine.update(&HolisticFrame::empty(), t(10)).unwrap();
        engine.reset();
        assert_eq!(engine.frames(), 0);
        // Clock was reset too
        assert!(engine.update(&HolisticFrame::empty(), t(0)).is_ok());
    }
}
