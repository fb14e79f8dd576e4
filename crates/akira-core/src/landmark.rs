//! Landmarks - detected anatomical keypoints
//!
//! Indices follow the holistic detector's topologies: 33 body points,
//! 21 points per hand and the 468-point face mesh (478 when irises are refined).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A detected keypoint in detector-normalized coordinates
///
/// Image-space collections have `x`/`y` in [0, 1] with `y` pointing down.
/// World-space body landmarks are meters around the hip center, also `y` down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Detection confidence in [0, 1]; face mesh points carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Raw coordinates
    #[inline]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Coordinates with `y` flipped so that up is positive
    #[inline]
    pub fn to_vec3_y_up(&self) -> Vec3 {
        Vec3::new(self.x, -self.y, self.z)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean distance to another landmark
    pub fn distance(&self, other: &Landmark) -> f32 {
        self.to_vec3().distance(other.to_vec3())
    }
}

/// Body landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// Number of body landmarks
    pub const COUNT: usize = 33;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Hand landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// Number of hand landmarks
    pub const COUNT: usize = 21;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Face mesh indices used by the expression and gaze solvers
pub mod face {
    /// Points in the base face mesh
    pub const MESH_COUNT: usize = 468;
    /// Points when iris refinement is enabled
    pub const MESH_WITH_IRIS_COUNT: usize = 478;

    pub const LEFT_EYE_UPPER: usize = 159;
    pub const LEFT_EYE_LOWER: usize = 145;
    pub const LEFT_EYE_INNER: usize = 133;
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const RIGHT_EYE_UPPER: usize = 386;
    pub const RIGHT_EYE_LOWER: usize = 374;
    pub const RIGHT_EYE_INNER: usize = 362;
    pub const RIGHT_EYE_OUTER: usize = 263;

    pub const LEFT_IRIS: usize = 468;
    pub const RIGHT_IRIS: usize = 473;

    /// Eye-width reference points for the adaptive blink threshold
    pub const LEFT_EYE_WIDTH_REF: usize = 130;
    pub const RIGHT_EYE_WIDTH_REF: usize = 359;

    pub const UPPER_LIP_TOP: usize = 0;
    pub const LOWER_LIP_BOTTOM: usize = 17;
    pub const UPPER_LIP_CENTER: usize = 13;
    pub const LOWER_LIP_CENTER: usize = 14;
    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;

    pub const LEFT_BROW_INNER: usize = 52;
    pub const LEFT_BROW_OUTER: usize = 70;
    pub const RIGHT_BROW_INNER: usize = 282;
    pub const RIGHT_BROW_OUTER: usize = 300;

    pub const LEFT_CHEEK: usize = 234;
    pub const RIGHT_CHEEK: usize = 454;
}
