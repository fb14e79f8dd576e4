//! Holistic detector results
//!
//! The detector reports up to one detection per feature. A frame where a
//! feature was not found simply has an empty collection for it.

use serde::{Deserialize, Serialize};

use crate::{AkiraError, AkiraResult, HandLandmark, Landmark, PoseLandmark, Side};

/// Raw detector result for one video frame
///
/// Mirrors the detector's JSON shape: every collection is a list of
/// detections, each detection a list of landmarks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HolisticResult {
    pub pose_world_landmarks: Option<Vec<Vec<Landmark>>>,
    pub left_hand_landmarks: Option<Vec<Vec<Landmark>>>,
    pub right_hand_landmarks: Option<Vec<Vec<Landmark>>>,
    pub pose_landmarks: Option<Vec<Vec<Landmark>>>,
    pub face_landmarks: Option<Vec<Vec<Landmark>>>,
}

/// One detector frame unwrapped into named landmark collections
#[derive(Debug, Clone, Default)]
pub struct HolisticFrame {
    /// World-space body landmarks
    pub body: Vec<Landmark>,
    /// Left hand landmarks
    pub left_hand: Vec<Landmark>,
    /// Right hand landmarks
    pub right_hand: Vec<Landmark>,
    /// Image-space (2D projected) body landmarks
    pub screen_body: Vec<Landmark>,
    /// Face mesh landmarks
    pub face: Vec<Landmark>,
}

fn first_detection(collection: Option<Vec<Vec<Landmark>>>) -> Vec<Landmark> {
    collection
        .and_then(|detections| detections.into_iter().next())
        .unwrap_or_default()
}

impl HolisticFrame {
    /// Unwrap the first detection of every collection
    pub fn parse(result: HolisticResult) -> Self {
        Self {
            body: first_detection(result.pose_world_landmarks),
            left_hand: first_detection(result.left_hand_landmarks),
            right_hand: first_detection(result.right_hand_landmarks),
            screen_body: first_detection(result.pose_landmarks),
            face: first_detection(result.face_landmarks),
        }
    }

    /// Frame with nothing detected
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hand collection for one side
    pub fn hand(&self, side: Side) -> &[Landmark] {
        match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        }
    }

    /// World-space body landmark, if detected
    #[inline]
    pub fn body_point(&self, point: PoseLandmark) -> Option<&Landmark> {
        self.body.get(point.index())
    }

    /// Image-space body landmark, if detected
    #[inline]
    pub fn screen_point(&self, point: PoseLandmark) -> Option<&Landmark> {
        self.screen_body.get(point.index())
    }

    /// Hand landmark, if that hand was detected
    #[inline]
    pub fn hand_point(&self, side: Side, point: HandLandmark) -> Option<&Landmark> {
        self.hand(side).get(point.index())
    }

    /// Face mesh landmark, if the face was detected
    #[inline]
    pub fn face_point(&self, index: usize) -> Option<&Landmark> {
        self.face.get(index)
    }

    /// True when no collection holds any landmark
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
            && self.left_hand.is_empty()
            && self.right_hand.is_empty()
            && self.screen_body.is_empty()
            && self.face.is_empty()
    }

    /// Reject frames carrying NaN or infinite coordinates
    pub fn validate(&self) -> AkiraResult<()> {
        let collections: [(&'static str, &[Landmark]); 5] = [
            ("body", &self.body),
            ("left_hand", &self.left_hand),
            ("right_hand", &self.right_hand),
            ("screen_body", &self.screen_body),
            ("face", &self.face),
        ];

        for (collection, landmarks) in collections {
            if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
                return Err(AkiraError::InvalidLandmark { collection, index });
            }
        }
        Ok(())
    }
}

impl From<HolisticResult> for HolisticFrame {
    fn from(result: HolisticResult) -> Self {
        Self::parse(result)
    }
}
