//! Face solver: expression morph targets and eye gaze
//!
//! Works on raw face mesh coordinates (image space, y down). Distances are
//! normalized by face width so the result does not depend on how close the
//! performer sits to the camera.

use akira_core::{face, Landmark, Morph};
use akira_filter::EuclideanHighPass;
use glam::{EulerRot, Quat, Vec3};

use crate::{ExpressionConfig, EyeGazeConfig};

/// Target weight per morph for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionTargets {
    pub weights: Vec<(Morph, f32)>,
}

impl ExpressionTargets {
    pub fn get(&self, morph: Morph) -> Option<f32> {
        self.weights
            .iter()
            .find(|(m, _)| *m == morph)
            .map(|(_, w)| *w)
    }
}

/// Mouth and brow measurements behind the morph targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMeasurements {
    pub blink_left: f32,
    pub blink_right: f32,
    /// Mouth height over face width
    pub mouth_height: f32,
    /// 0 closed, 1 fully open
    pub openness: f32,
    /// >0 wide, <0 narrow
    pub stretch: f32,
    /// Corner lift, 0..1
    pub smile: f32,
    /// Mean inner brow y (image space, larger is lower)
    pub brow_height: f32,
    /// Outer minus inner brow y
    pub brow_furrow: f32,
}

fn dist(a: &Landmark, b: &Landmark) -> f32 {
    a.distance(b)
}

/// Measure the face, `None` unless the full mesh is present
pub fn measure_face(mesh: &[Landmark], config: &ExpressionConfig) -> Option<FaceMeasurements> {
    if mesh.len() < face::MESH_COUNT {
        return None;
    }
    let p = |i: usize| &mesh[i];

    // Blink
    let eye_width = dist(p(face::LEFT_EYE_WIDTH_REF), p(face::RIGHT_EYE_WIDTH_REF));
    let threshold = eye_width * config.blink_ratio;
    let closure = |upper: usize, lower: usize| {
        if threshold <= f32::EPSILON {
            return 0.0;
        }
        (1.0 - dist(p(upper), p(lower)) / threshold).clamp(0.0, 1.0)
    };
    let blink_left = closure(face::LEFT_EYE_UPPER, face::LEFT_EYE_LOWER);
    let blink_right = closure(face::RIGHT_EYE_UPPER, face::RIGHT_EYE_LOWER);

    // Mouth
    let face_width = dist(p(face::LEFT_CHEEK), p(face::RIGHT_CHEEK));
    if face_width <= f32::EPSILON {
        return None;
    }
    let mouth_height = dist(p(face::UPPER_LIP_TOP), p(face::LOWER_LIP_BOTTOM)) / face_width;
    let mouth_width = dist(p(face::MOUTH_LEFT), p(face::MOUTH_RIGHT)) / face_width;
    let openness = ((mouth_height - config.mouth_closed) / config.mouth_open_range).clamp(0.0, 1.0);
    let stretch = (mouth_width - config.mouth_neutral_width) / config.mouth_stretch_range;

    let mouth_center_y = (p(face::UPPER_LIP_CENTER).y + p(face::LOWER_LIP_CENTER).y) / 2.0;
    let lift = ((mouth_center_y - p(face::MOUTH_LEFT).y) + (mouth_center_y - p(face::MOUTH_RIGHT).y))
        / 2.0;
    let smile = (lift / config.smile_lift).clamp(0.0, 1.0);

    // Brows
    let brow_height = (p(face::LEFT_BROW_INNER).y + p(face::RIGHT_BROW_INNER).y) / 2.0;
    let brow_outer = (p(face::LEFT_BROW_OUTER).y + p(face::RIGHT_BROW_OUTER).y) / 2.0;

    Some(FaceMeasurements {
        blink_left,
        blink_right,
        mouth_height,
        openness,
        stretch,
        smile,
        brow_height,
        brow_furrow: brow_outer - brow_height,
    })
}

/// Morph targets from measurements
pub fn expression_targets(m: &FaceMeasurements, visemes: bool) -> ExpressionTargets {
    let mut weights = vec![
        (
            Morph::Surprise,
            (m.openness * 0.8 + (0.45 - m.brow_height) * 3.0).max(0.0),
        ),
        (
            Morph::Anger,
            ((0.5 - m.brow_height) * 2.0 + (0.2 - m.openness) * 2.0).max(0.0),
        ),
        (Morph::Worry, (m.brow_furrow * 3.0).max(0.0)),
        (
            Morph::Disgust,
            ((0.52 - m.brow_height) * 1.5 + (0.15 - m.mouth_height) * 5.0).max(0.0),
        ),
        (Morph::Blink, m.blink_left),
        (Morph::BlinkRight, m.blink_right),
    ];

    if visemes {
        weights.extend([
            (Morph::A, m.openness.powf(1.5)),
            (Morph::I, m.stretch.max(0.0) * 0.8),
            (Morph::U, (-m.stretch).max(0.0) * 0.8),
            (Morph::E, (m.stretch * 0.5).max(0.0) * m.smile),
            (Morph::O, (m.openness - 0.3).max(0.0) * 1.5),
        ]);
    }

    ExpressionTargets { weights }
}

/// Expression solver with blink hysteresis
#[derive(Debug, Clone)]
pub struct ExpressionSolver {
    config: ExpressionConfig,
    blink: EuclideanHighPass,
}

impl ExpressionSolver {
    pub fn new(config: ExpressionConfig) -> Self {
        Self {
            blink: EuclideanHighPass::new(config.blink_deadband),
            config,
        }
    }

    /// Targets for this frame, `None` without a face
    pub fn solve(&mut self, mesh: &[Landmark]) -> Option<ExpressionTargets> {
        let mut m = measure_face(mesh, &self.config)?;
        let blink = self
            .blink
            .update(Vec3::new(m.blink_left, m.blink_right, 0.0));
        m.blink_left = blink.x;
        m.blink_right = blink.y;
        Some(expression_targets(&m, self.config.visemes))
    }

    pub fn reset(&mut self) {
        self.blink.reset();
    }
}

/// Eye rotations from iris offsets, `None` without iris points
pub fn eye_gaze(mesh: &[Landmark], config: &EyeGazeConfig) -> Option<(Quat, Quat)> {
    if mesh.len() < face::MESH_WITH_IRIS_COUNT {
        return None;
    }
    let scaled = |i: usize| mesh[i].to_vec3() * config.point_scale;

    let eye = |iris: usize, inner: usize, outer: usize| {
        let center = (scaled(inner) + scaled(outer)) * 0.5;
        let offset = scaled(iris) - center;
        let yaw = (-offset.x * config.sensitivity).clamp(-config.max_angle, config.max_angle);
        let pitch = (-offset.y * config.sensitivity).clamp(-config.max_angle, config.max_angle);
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
    };

    Some((
        eye(face::LEFT_IRIS, face::LEFT_EYE_INNER, face::LEFT_EYE_OUTER),
        eye(face::RIGHT_IRIS, face::RIGHT_EYE_INNER, face::RIGHT_EYE_OUTER),
    ))
}
