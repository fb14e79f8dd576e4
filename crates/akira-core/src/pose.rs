//! Pose frames - the engine's per-frame output
//!
//! The renderer applies a pose frame to its own scene graph; the recorder
//! snapshots it into a keyframe. Neither needs access to the engine's state.

use glam::{Quat, Vec3};

use crate::{Bone, Morph};

/// Coordinate space a rotation is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    /// Relative to the parent bone
    #[default]
    Local,
    /// Relative to the model root
    World,
}

/// Bone state (position + rotation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub bone: Bone,
    pub position: Vec3,
    pub rotation: Quat,
    pub space: Space,
}

impl BoneTransform {
    /// Rest pose: zero offset, no rotation
    pub fn rest(bone: Bone) -> Self {
        Self {
            bone,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            space: Space::Local,
        }
    }
}

/// Morph weight in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphWeight {
    pub morph: Morph,
    pub weight: f32,
}

/// Complete pose for one processed frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    /// Every bone the model has, in skeleton order
    pub bones: Vec<BoneTransform>,
    /// Every morph the model has
    pub morphs: Vec<MorphWeight>,
}

impl PoseFrame {
    /// Get bone state by bone
    pub fn bone(&self, bone: Bone) -> Option<&BoneTransform> {
        self.bones.iter().find(|t| t.bone == bone)
    }

    /// Get morph weight by morph
    pub fn morph(&self, morph: Morph) -> Option<f32> {
        self.morphs
            .iter()
            .find(|m| m.morph == morph)
            .map(|m| m.weight)
    }

    /// Rotation of a bone, identity when the model lacks it
    pub fn rotation(&self, bone: Bone) -> Quat {
        self.bone(bone).map(|t| t.rotation).unwrap_or(Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut head = BoneTransform::rest(Bone::Head);
        head.rotation = Quat::from_rotation_y(0.5);

        let frame = PoseFrame {
            bones: vec![BoneTransform::rest(Bone::Root), head],
            morphs: vec![MorphWeight {
                morph: Morph::Blink,
                weight: 0.25,
            }],
        };

        assert_eq!(frame.bone(Bone::Root).unwrap().position, Vec3::ZERO);
        assert_eq!(frame.rotation(Bone::Head), Quat::from_rotation_y(0.5));
        assert_eq!(frame.rotation(Bone::Neck), Quat::IDENTITY);
        assert_eq!(frame.morph(Morph::Blink), Some(0.25));
        assert_eq!(frame.morph(Morph::Anger), None);
    }
}
