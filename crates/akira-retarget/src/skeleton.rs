//! Skeleton - the bound model's bone and morph state
//!
//! Built once when a model is bound, from whatever subset of the known bones
//! and morphs that model actually has. Writes to anything the model lacks are
//! silently dropped.

use akira_core::{Bone, BoneTransform, Morph, MorphWeight, PoseFrame, Space};
use glam::{Quat, Vec3};
use tracing::debug;

use crate::math::slerp;

/// Bone and morph state of the bound model
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<BoneTransform>,
    bone_slots: [Option<usize>; Bone::COUNT],
    morphs: Vec<MorphWeight>,
    morph_slots: [Option<usize>; Morph::COUNT],
}

impl Skeleton {
    /// Skeleton holding the given bones and morphs at rest
    ///
    /// Duplicates are ignored. Bones are kept in enumeration order.
    pub fn new(
        bones: impl IntoIterator<Item = Bone>,
        morphs: impl IntoIterator<Item = Morph>,
    ) -> Self {
        let mut bone_list: Vec<Bone> = bones.into_iter().collect();
        bone_list.sort();
        bone_list.dedup();

        let mut morph_list: Vec<Morph> = morphs.into_iter().collect();
        morph_list.sort();
        morph_list.dedup();

        let mut bone_slots = [None; Bone::COUNT];
        for (i, bone) in bone_list.iter().enumerate() {
            bone_slots[*bone as usize] = Some(i);
        }
        let mut morph_slots = [None; Morph::COUNT];
        for (i, morph) in morph_list.iter().enumerate() {
            morph_slots[*morph as usize] = Some(i);
        }

        Self {
            bones: bone_list.into_iter().map(BoneTransform::rest).collect(),
            bone_slots,
            morphs: morph_list
                .into_iter()
                .map(|morph| MorphWeight { morph, weight: 0.0 })
                .collect(),
            morph_slots,
        }
    }

    /// Skeleton with every known bone and morph
    pub fn full() -> Self {
        Self::new(Bone::ALL, Morph::ALL)
    }

    /// Resolve a model's bone and morph names
    ///
    /// Names without a known counterpart are skipped.
    pub fn from_names<'a>(
        bone_names: impl IntoIterator<Item = &'a str>,
        morph_names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut unknown = 0usize;
        let bones: Vec<Bone> = bone_names
            .into_iter()
            .filter_map(|name| {
                let bone = Bone::from_name(name);
                if bone.is_none() {
                    unknown += 1;
                }
                bone
            })
            .collect();
        let morphs: Vec<Morph> = morph_names.into_iter().filter_map(Morph::from_name).collect();

        let skeleton = Self::new(bones, morphs);
        debug!(
            bones = skeleton.bone_count(),
            morphs = skeleton.morph_count(),
            unknown_bones = unknown,
            "skeleton bound"
        );
        skeleton
    }

    #[inline]
    fn slot(&self, bone: Bone) -> Option<usize> {
        self.bone_slots[bone as usize]
    }

    #[inline]
    fn morph_slot(&self, morph: Morph) -> Option<usize> {
        self.morph_slots[morph as usize]
    }

    pub fn has_bone(&self, bone: Bone) -> bool {
        self.slot(bone).is_some()
    }

    pub fn has_morph(&self, morph: Morph) -> bool {
        self.morph_slot(morph).is_some()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }

    pub fn bones(&self) -> &[BoneTransform] {
        &self.bones
    }

    pub fn morphs(&self) -> &[MorphWeight] {
        &self.morphs
    }

    pub fn bone(&self, bone: Bone) -> Option<&BoneTransform> {
        self.slot(bone).map(|i| &self.bones[i])
    }

    pub fn rotation(&self, bone: Bone) -> Option<Quat> {
        self.bone(bone).map(|t| t.rotation)
    }

    pub fn position(&self, bone: Bone) -> Option<Vec3> {
        self.bone(bone).map(|t| t.position)
    }

    pub fn morph_weight(&self, morph: Morph) -> Option<f32> {
        self.morph_slot(morph).map(|i| self.morphs[i].weight)
    }

    /// Step a bone's rotation toward `target` by `factor`
    ///
    /// No-op when the model lacks the bone.
    pub fn set_rotation(&mut self, bone: Bone, target: Quat, space: Space, factor: f32) {
        if let Some(i) = self.slot(bone) {
            let state = &mut self.bones[i];
            state.rotation = slerp(state.rotation, target, factor);
            state.space = space;
        }
    }

    /// Name-based [`Skeleton::set_rotation`] in local space
    pub fn set_rotation_by_name(&mut self, name: &str, target: Quat, factor: f32) {
        if let Some(bone) = Bone::from_name(name) {
            self.set_rotation(bone, target, Space::Local, factor);
        }
    }

    /// Step a bone's position toward `target` by `factor`
    pub fn lerp_position(&mut self, bone: Bone, target: Vec3, factor: f32) {
        if let Some(i) = self.slot(bone) {
            let state = &mut self.bones[i];
            state.position = state.position.lerp(target, factor);
        }
    }

    /// Step a morph toward `target` by `factor`, clamped to [0, 1]
    pub fn lerp_morph(&mut self, morph: Morph, target: f32, factor: f32) {
        if let Some(i) = self.morph_slot(morph) {
            let w = &mut self.morphs[i].weight;
            *w = (*w + (target - *w) * factor).clamp(0.0, 1.0);
        }
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> PoseFrame {
        PoseFrame {
            bones: self.bones.clone(),
            morphs: self.morphs.clone(),
        }
    }

    /// Back to rest pose with all morphs at zero
    pub fn reset(&mut self) {
        for state in &mut self.bones {
            *state = BoneTransform::rest(state.bone);
        }
        for m in &mut self.morphs {
            m.weight = 0.0;
        }
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular_distance;

    #[test]
    fn test_missing_bone_write_is_noop() {
        let mut skeleton = Skeleton::new([Bone::Head, Bone::Neck], []);
        let before = skeleton.snapshot();

        skeleton.set_rotation(Bone::LeftWrist, Quat::from_rotation_x(1.0), Space::Local, 0.3);
        skeleton.lerp_position(Bone::Root, Vec3::ONE, 0.3);
        skeleton.lerp_morph(Morph::Blink, 1.0, 0.3);
        skeleton.set_rotation_by_name("存在しない", Quat::from_rotation_x(1.0), 0.3);

        assert_eq!(skeleton.snapshot(), before);
        assert!(!skeleton.has_bone(Bone::LeftWrist));
        assert_eq!(skeleton.rotation(Bone::LeftWrist), None);
    }

    #[test]
    fn test_set_rotation_is_damped() {
        let mut skeleton = Skeleton::full();
        let target = Quat::from_rotation_y(1.0);
        skeleton.set_rotation(Bone::Head, target, Space::Local, 0.3);

        let rot = skeleton.rotation(Bone::Head).unwrap();
        assert!((angular_distance(Quat::IDENTITY, rot) - 0.3).abs() < 1e-4);
        assert!((rot.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_space_flag_recorded() {
        let mut skeleton = Skeleton::full();
        skeleton.set_rotation(Bone::LeftAnkle, Quat::IDENTITY, Space::World, 0.3);
        assert_eq!(skeleton.bone(Bone::LeftAnkle).unwrap().space, Space::World);
        assert_eq!(skeleton.bone(Bone::RightAnkle).unwrap().space, Space::Local);
    }

    #[test]
    fn test_from_names() {
        let skeleton = Skeleton::from_names(["頭", "首", "首", "スカート"], ["まばたき", "ウィンク"]);
        assert_eq!(skeleton.bone_count(), 2);
        assert_eq!(skeleton.morph_count(), 1);
        assert_eq!(skeleton.bones()[0].bone, Bone::Neck);
        assert!(skeleton.has_morph(Morph::Blink));
    }

    #[test]
    fn test_set_rotation_by_name() {
        let mut skeleton = Skeleton::full();
        skeleton.set_rotation_by_name("頭", Quat::from_rotation_x(0.5), 1.0);
        let rot = skeleton.rotation(Bone::Head).unwrap();
        assert!(angular_distance(rot, Quat::from_rotation_x(0.5)) < 1e-4);
    }

    #[test]
    fn test_morph_lerp_clamped() {
        let mut skeleton = Skeleton::full();
        skeleton.lerp_morph(Morph::Surprise, 5.0, 0.3);
        assert_eq!(skeleton.morph_weight(Morph::Surprise), Some(1.0));
        skeleton.lerp_morph(Morph::Surprise, -5.0, 0.3);
        assert_eq!(skeleton.morph_weight(Morph::Surprise), Some(0.0));
        skeleton.lerp_morph(Morph::Surprise, 1.0, 0.3);
        assert!((skeleton.morph_weight(Morph::Surprise).unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut skeleton = Skeleton::full();
        skeleton.set_rotation(Bone::Head, Quat::from_rotation_x(0.5), Space::Local, 1.0);
        skeleton.lerp_position(Bone::Root, Vec3::ONE, 1.0);
        skeleton.lerp_morph(Morph::A, 1.0, 1.0);
        skeleton.reset();
        assert_eq!(skeleton.snapshot(), Skeleton::full().snapshot());
    }
}
