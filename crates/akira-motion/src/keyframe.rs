//! Keyframes and clips

use akira_core::{Bone, BoneTransform, Morph, MorphWeight, PoseFrame};
use glam::{Quat, Vec3};

/// Immutable snapshot of a full pose
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    index: u32,
    bones: Vec<BoneTransform>,
    morphs: Vec<MorphWeight>,
}

impl Keyframe {
    /// Snapshot a pose as frame `index` of its clip
    pub fn new(index: u32, pose: &PoseFrame) -> Self {
        Self {
            index,
            bones: pose.bones.clone(),
            morphs: pose.morphs.clone(),
        }
    }

    /// Sequential index within the clip
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn bones(&self) -> &[BoneTransform] {
        &self.bones
    }

    #[inline]
    pub fn morphs(&self) -> &[MorphWeight] {
        &self.morphs
    }

    pub fn bone(&self, bone: Bone) -> Option<&BoneTransform> {
        self.bones.iter().find(|t| t.bone == bone)
    }

    pub fn rotation(&self, bone: Bone) -> Option<Quat> {
        self.bone(bone).map(|t| t.rotation)
    }

    pub fn position(&self, bone: Bone) -> Option<Vec3> {
        self.bone(bone).map(|t| t.position)
    }

    pub fn morph(&self, morph: Morph) -> Option<f32> {
        self.morphs
            .iter()
            .find(|m| m.morph == morph)
            .map(|m| m.weight)
    }
}

/// Ordered keyframes recorded from one source
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    index: usize,
    keyframes: Vec<Keyframe>,
}

impl Clip {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            keyframes: Vec::new(),
        }
    }

    /// Build a clip from poses, numbering them in order
    pub fn from_poses<'a>(index: usize, poses: impl IntoIterator<Item = &'a PoseFrame>) -> Self {
        let mut clip = Self::new(index);
        for pose in poses {
            clip.push(pose);
        }
        clip
    }

    /// Clip (source) index
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keyframes.first()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    /// Append a pose as the next keyframe
    pub fn push(&mut self, pose: &PoseFrame) -> &Keyframe {
        let index = self.keyframes.len() as u32;
        self.keyframes.push(Keyframe::new(index, pose));
        &self.keyframes[self.keyframes.len() - 1]
    }
}
