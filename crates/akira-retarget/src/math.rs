//! Rotation helpers
//!
//! glam's own `slerp` goes through an approximate `acos`; the damped bone
//! writes need the exact angle so a step of factor `f` moves exactly `f·θ`.

use glam::{Quat, Vec3};

/// Vectors shorter than this carry no direction
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Spherical linear interpolation from `from` toward `to`
///
/// Takes the short way round. Nearly identical rotations fall back to a
/// normalized lerp.
pub fn slerp(from: Quat, to: Quat, t: f32) -> Quat {
    let mut dot = from.dot(to);

    let to = if dot < 0.0 {
        dot = -dot;
        -to
    } else {
        to
    };

    if dot > 0.9995 {
        return from.lerp(to, t).normalize();
    }

    let theta_0 = dot.min(1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    (from * s0 + to * s1).normalize()
}

/// Rotation angle between two unit quaternions, in [0, π]
pub fn angular_distance(a: Quat, b: Quat) -> f32 {
    let dot = a.dot(b).abs().min(1.0);
    2.0 * dot.acos()
}

/// Unit direction from `from` to `to`, `None` when the points coincide
#[inline]
pub fn direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    (to - from).try_normalize()
}

/// Shortest rotation taking unit vector `from` onto unit vector `to`
///
/// Antiparallel inputs rotate half a turn about any perpendicular axis.
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    Quat::from_rotation_arc(from, to).normalize()
}

/// Express a world direction in the frame of a parent rotation
#[inline]
pub fn to_parent_local(parent: Quat, dir: Vec3) -> Vec3 {
    parent.inverse() * dir
}

/// Shortest arc from `reference` to the direction `from → to` seen from
/// `parent`; `None` when the direction is degenerate
pub fn local_arc(parent: Quat, reference: Vec3, from: Vec3, to: Vec3) -> Option<Quat> {
    let dir = direction(from, to)?;
    let local = to_parent_local(parent, dir).try_normalize()?;
    Some(shortest_arc(reference, local))
}

/// Twist part of `q` about unit `axis` (swing-twist decomposition)
pub fn twist_about(q: Quat, axis: Vec3) -> Quat {
    let proj = axis * Vec3::new(q.x, q.y, q.z).dot(axis);
    let twist = Quat::from_xyzw(proj.x, proj.y, proj.z, q.w);
    if twist.length_squared() <= DIRECTION_EPSILON {
        return Quat::IDENTITY;
    }
    twist.normalize()
}

/// Signed angle about +Y from `reference` to `v`, both projected on XZ
pub fn signed_yaw(reference: Vec3, v: Vec3) -> Option<f32> {
    let a = Vec3::new(reference.x, 0.0, reference.z).try_normalize()?;
    let b = Vec3::new(v.x, 0.0, v.z).try_normalize()?;
    let cross = a.cross(b).y;
    let dot = a.dot(b);
    Some(cross.atan2(dot))
}

/// Midpoint of two points
#[inline]
pub fn center(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}
