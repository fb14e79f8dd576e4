//! Clip to VMD exporter
//!
//! Export runs in three passes over a clip:
//! 1. Uniform sampling with a stride chosen so at most `frame_cap` frames
//!    survive, counting the boundary frame.
//! 2. Dropping every sampled frame that is similar to the last kept one.
//! 3. Appending the final frame unless it is similar to the last kept one.

use std::io::Write;

use akira_core::{AkiraError, AkiraResult, Bone};
use akira_motion::{Clip, Keyframe};
use bytes::{BufMut, Bytes, BytesMut};
use glam::Vec3;
use tracing::{debug, info};

use crate::{
    encoded_size, ExportConfig, INTERPOLATION_SIZE, MAGIC, MAGIC_SIZE, MODEL_NAME_SIZE, NAME_SIZE,
    TRAILING_SECTIONS,
};

/// Smallest stride keeping `total` frames within `cap`
///
/// The last frame is counted even when it falls between strides, since
/// the exporter may append it.
pub fn sampling_stride(total: usize, cap: usize) -> usize {
    if total <= cap || cap < 2 {
        return 1;
    }

    let mut stride = (total / cap).max(1);
    loop {
        let sampled = (total + stride - 1) / stride;
        let boundary = usize::from((total - 1) % stride != 0);
        if sampled + boundary <= cap {
            return stride;
        }
        stride += 1;
    }
}

/// Position written for a bone
fn export_position(config: &ExportConfig, bone: Bone, position: Vec3) -> Vec3 {
    if config.keeps_position(bone) {
        position
    } else {
        Vec3::ZERO
    }
}

/// Whether two keyframes would look the same once exported
pub fn frames_similar(a: &Keyframe, b: &Keyframe, config: &ExportConfig) -> bool {
    let threshold = config.similarity_threshold;
    let close = |x: f32, y: f32, limit: f32| (x - y).abs() <= limit;

    for (ba, bb) in a.bones().iter().zip(b.bones()) {
        let pa = export_position(config, ba.bone, ba.position);
        let pb = export_position(config, bb.bone, bb.position);
        if !(close(pa.x, pb.x, threshold)
            && close(pa.y, pb.y, threshold)
            && close(pa.z, pb.z, threshold))
        {
            return false;
        }

        let (ra, rb) = (ba.rotation, bb.rotation);
        if !(close(ra.x, rb.x, threshold)
            && close(ra.y, rb.y, threshold)
            && close(ra.z, rb.z, threshold)
            && close(ra.w, rb.w, threshold))
        {
            return false;
        }
    }

    let morph_threshold = config.morph_threshold();
    a.morphs()
        .iter()
        .zip(b.morphs())
        .all(|(ma, mb)| close(ma.weight, mb.weight, morph_threshold))
}

/// VMD exporter
#[derive(Debug, Clone, Default)]
pub struct VmdExporter {
    config: ExportConfig,
}

impl VmdExporter {
    pub fn new(config: ExportConfig) -> AkiraResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Indices of the keyframes that end up in the file, in order
    pub fn select(&self, clip: &Clip) -> Vec<usize> {
        let frames = clip.keyframes();
        let total = frames.len();
        if total == 0 {
            return Vec::new();
        }

        let stride = sampling_stride(total, self.config.frame_cap);
        let mut kept = vec![0];
        let mut sampled = 1;
        for i in (stride..total).step_by(stride) {
            sampled += 1;
            let last = kept[kept.len() - 1];
            if !frames_similar(&frames[last], &frames[i], &self.config) {
                kept.push(i);
            }
        }

        let end = total - 1;
        let last = kept[kept.len() - 1];
        if last != end && !frames_similar(&frames[last], &frames[end], &self.config) {
            kept.push(end);
        }

        debug!(
            clip = clip.index(),
            total,
            stride,
            sampled,
            kept = kept.len(),
            "frames selected"
        );
        kept
    }

    /// Encode a clip as a VMD file
    pub fn export(&self, clip: &Clip) -> AkiraResult<Bytes> {
        if clip.is_empty() {
            return Err(AkiraError::EmptyClip { clip: clip.index() });
        }

        let selected = self.select(clip);
        let frames: Vec<&Keyframe> = selected.iter().map(|&i| &clip.keyframes()[i]).collect();
        let bytes = self.encode(&frames);

        info!(
            clip = clip.index(),
            recorded = clip.len(),
            written = frames.len(),
            size = bytes.len(),
            "clip exported"
        );
        Ok(bytes)
    }

    /// Export a clip into a writer, returning the bytes written
    pub fn write_to<W: Write>(&self, clip: &Clip, mut writer: W) -> AkiraResult<usize> {
        let bytes = self.export(clip)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(bytes.len())
    }

    /// Serialize frames; the frame number of each record is its position in `frames`
    pub fn encode(&self, frames: &[&Keyframe]) -> Bytes {
        let bone_records: usize = frames.iter().map(|k| k.bones().len()).sum();
        let morph_records: usize = frames.iter().map(|k| k.morphs().len()).sum();
        let mut buf = BytesMut::with_capacity(encoded_size(bone_records, morph_records));

        // Header
        buf.put_slice(MAGIC);
        buf.put_bytes(0, MAGIC_SIZE - MAGIC.len());
        buf.put_bytes(0, MODEL_NAME_SIZE);

        // Bone records
        buf.put_u32_le(bone_records as u32);
        for (frame, keyframe) in frames.iter().enumerate() {
            for bone in keyframe.bones() {
                let position = export_position(&self.config, bone.bone, bone.position);
                put_name(&mut buf, bone.bone.vmd_name());
                buf.put_u32_le(frame as u32);
                buf.put_f32_le(position.x);
                buf.put_f32_le(position.y);
                buf.put_f32_le(position.z);
                buf.put_f32_le(bone.rotation.x);
                buf.put_f32_le(bone.rotation.y);
                buf.put_f32_le(bone.rotation.z);
                buf.put_f32_le(bone.rotation.w);
                buf.put_bytes(self.config.interpolation, INTERPOLATION_SIZE);
            }
        }

        // Morph records
        buf.put_u32_le(morph_records as u32);
        for (frame, keyframe) in frames.iter().enumerate() {
            for morph in keyframe.morphs() {
                put_name(&mut buf, morph.morph.vmd_name());
                buf.put_u32_le(frame as u32);
                buf.put_f32_le(morph.weight);
            }
        }

        // Camera, light, shadow: unsupported, always empty
        for _ in 0..TRAILING_SECTIONS {
            buf.put_u32_le(0);
        }

        buf.freeze()
    }
}

/// Fixed-width name, zero padded, truncated past `NAME_SIZE`
fn put_name(buf: &mut BytesMut, name: &[u8]) {
    let len = name.len().min(NAME_SIZE);
    buf.put_slice(&name[..len]);
    buf.put_bytes(0, NAME_SIZE - len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{VmdMotion, BONE_RECORD_SIZE, HEADER_SIZE, LINEAR_INTERPOLATION};
    use akira_core::{BoneTransform, Morph, MorphWeight, PoseFrame, Space};
    use glam::Quat;
    use proptest::prelude::*;

    fn pose(bones: &[(Bone, Vec3, Quat)], morphs: &[(Morph, f32)]) -> PoseFrame {
        PoseFrame {
            bones: bones
                .iter()
                .map(|&(bone, position, rotation)| BoneTransform {
                    bone,
                    position,
                    rotation,
                    space: Space::Local,
                })
                .collect(),
            morphs: morphs
                .iter()
                .map(|&(morph, weight)| MorphWeight { morph, weight })
                .collect(),
        }
    }

    fn turning_clip(frames: usize) -> Clip {
        let poses: Vec<PoseFrame> = (0..frames)
            .map(|i| {
                pose(
                    &[(Bone::Head, Vec3::ZERO, Quat::from_rotation_y(i as f32 * 0.01))],
                    &[],
                )
            })
            .collect();
        Clip::from_poses(0, &poses)
    }

    #[test]
    fn test_stride() {
        assert_eq!(sampling_stride(10, 3000), 1);
        assert_eq!(sampling_stride(3000, 3000), 1);
        // floor(5999 / 3000) = 1 would keep every frame
        assert_eq!(sampling_stride(5999, 3000), 2);
        assert_eq!(sampling_stride(6000, 3000), 3);
        assert_eq!(sampling_stride(6001, 3000), 3);
    }

    proptest! {
        #[test]
        fn prop_stride_respects_cap(total in 1usize..50_000, cap in 2usize..5_000) {
            let stride = sampling_stride(total, cap);
            let sampled = (total + stride - 1) / stride;
            let boundary = usize::from((total - 1) % stride != 0);
            prop_assert!(sampled + boundary <= cap);
        }
    }

    #[test]
    fn test_round_trip() {
        let a = pose(
            &[(Bone::Root, Vec3::new(1.5, -2.25, 0.125), Quat::from_xyzw(0.0, 0.6, 0.0, 0.8))],
            &[(Morph::Blink, 0.25)],
        );
        let b = pose(
            &[(Bone::Root, Vec3::new(-3.0, 0.5, 7.75), Quat::from_xyzw(0.6, 0.0, 0.0, 0.8))],
            &[(Morph::Blink, 0.75)],
        );
        let clip = Clip::from_poses(0, [&a, &b]);

        let bytes = VmdExporter::default().export(&clip).unwrap();
        assert_eq!(bytes.len(), encoded_size(2, 2));

        let motion = VmdMotion::parse(&bytes).unwrap();
        assert_eq!(&bytes[..MAGIC.len()], b"Vocaloid Motion Data 0002");
        assert_eq!(motion.bone_frames.len(), 2);
        assert_eq!(motion.morph_frames.len(), 2);

        for (frame, source) in motion.bone_frames.iter().zip([&a, &b]) {
            let expected = &source.bones[0];
            assert_eq!(frame.bone, Some(Bone::Root));
            assert_eq!(frame.position.to_array().map(f32::to_bits), expected.position.to_array().map(f32::to_bits));
            assert_eq!(frame.rotation.to_array().map(f32::to_bits), expected.rotation.to_array().map(f32::to_bits));
            assert_eq!(frame.interpolation, [LINEAR_INTERPOLATION; INTERPOLATION_SIZE]);
        }
        assert_eq!(motion.bone_frames[0].frame, 0);
        assert_eq!(motion.bone_frames[1].frame, 1);
        assert_eq!(motion.morph_frames[1].morph, Some(Morph::Blink));
        assert_eq!(motion.morph_frames[1].weight.to_bits(), 0.75f32.to_bits());
    }

    #[test]
    fn test_rotation_only_bones_lose_position() {
        let a = pose(&[(Bone::Head, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY)], &[]);
        let clip = Clip::from_poses(0, [&a]);
        let bytes = VmdExporter::default().export(&clip).unwrap();
        let motion = VmdMotion::parse(&bytes).unwrap();
        assert_eq!(motion.bone_frames[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_empty_clip_rejected() {
        let clip = Clip::new(4);
        assert!(matches!(
            VmdExporter::default().export(&clip),
            Err(AkiraError::EmptyClip { clip: 4 })
        ));
    }

    #[test]
    fn test_static_run_collapses() {
        let still = pose(&[(Bone::Head, Vec3::ZERO, Quat::IDENTITY)], &[(Morph::A, 0.5)]);
        let clip = Clip::from_poses(0, std::iter::repeat(&still).take(100));
        assert_eq!(VmdExporter::default().select(&clip), vec![0]);
    }

    #[test]
    fn test_morph_threshold_is_looser() {
        let config = ExportConfig::default();
        let a = Keyframe::new(0, &pose(&[], &[(Morph::A, 0.50)]));
        let b = Keyframe::new(1, &pose(&[], &[(Morph::A, 0.52)]));
        let c = Keyframe::new(2, &pose(&[], &[(Morph::A, 0.54)]));
        assert!(frames_similar(&a, &b, &config));
        assert!(!frames_similar(&a, &c, &config));
    }

    #[test]
    fn test_idle_then_motion() {
        let mut poses = Vec::new();
        for _ in 0..10 {
            poses.push(pose(&[(Bone::Head, Vec3::ZERO, Quat::IDENTITY)], &[]));
        }
        for i in 1..=5 {
            poses.push(pose(&[(Bone::Head, Vec3::ZERO, Quat::from_rotation_x(i as f32 * 0.1))], &[]));
        }
        let clip = Clip::from_poses(0, &poses);
        assert_eq!(VmdExporter::default().select(&clip), vec![0, 10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_frame_cap_keeps_boundaries() {
        let clip = turning_clip(7001);
        let exporter = VmdExporter::default();
        let selected = exporter.select(&clip);

        assert!(selected.len() <= 3000);
        assert_eq!(selected[0], 0);
        assert_eq!(selected[selected.len() - 1], 7000);

        let bytes = exporter.export(&clip).unwrap();
        let count = u32::from_le_bytes([
            bytes[HEADER_SIZE],
            bytes[HEADER_SIZE + 1],
            bytes[HEADER_SIZE + 2],
            bytes[HEADER_SIZE + 3],
        ]) as usize;
        assert!(count <= 3000);
        assert_eq!(bytes.len(), encoded_size(count, 0));
        assert!(bytes.len() > count * BONE_RECORD_SIZE);

        let motion = VmdMotion::parse(&bytes).unwrap();
        let last = &motion.bone_frames[motion.bone_frames.len() - 1];
        let expected = clip.keyframes()[7000].rotation(Bone::Head).unwrap();
        assert_eq!(last.rotation.to_array().map(f32::to_bits), expected.to_array().map(f32::to_bits));
    }

    #[test]
    fn test_long_names_truncate() {
        let mut buf = BytesMut::new();
        put_name(&mut buf, b"0123456789abcdefghij");
        assert_eq!(&buf[..], b"0123456789abcde");

        let mut buf = BytesMut::new();
        put_name(&mut buf, b"abc");
        assert_eq!(buf.len(), NAME_SIZE);
        assert!(buf[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_to() {
        let clip = turning_clip(3);
        let mut out = Vec::new();
        let written = VmdExporter::default().write_to(&clip, &mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(&out[..MAGIC.len()], MAGIC);
    }
}
