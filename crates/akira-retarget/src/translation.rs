//! Root and foot IK translation targets
//!
//! There is no metric depth in a single camera image. The distance between
//! the image-space hip and shoulder centers stands in for it: a performer
//! stepping back looks shorter.

use glam::Vec3;

use crate::body::Pair;
use crate::{FootIkConfig, RootMotionConfig};

/// Root position target from image-space hips and shoulders (+Y up)
pub fn root_target(hips: Pair, shoulders: Pair, config: &RootMotionConfig) -> Vec3 {
    let hip_center = hips.center();
    let spine = hip_center.distance(shoulders.center());

    let depth = (spine - 1.0).clamp(-2.0, 0.0);
    let z = depth * (depth * -2.0).powi(2);
    let x = (hip_center.x - config.center_x).clamp(-1.0, 1.0) * config.damping * z;

    Vec3::new(-x * config.x_scale, hip_center.y, z * config.z_scale)
}

/// Foot IK target from a filtered world-space ankle (+Y up)
pub fn foot_ik_target(ankle: Vec3, config: &FootIkConfig) -> Vec3 {
    ankle * config.scale + Vec3::Y * config.y_offset
}
