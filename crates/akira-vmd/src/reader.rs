//! VMD motion reader
//!
//! Parses the bone and morph sections. Camera, light and shadow sections
//! are only counted; their records are not decoded.

use std::collections::BTreeSet;

use akira_core::{AkiraError, AkiraResult, Bone, Morph};
use bytes::Buf;
use glam::{Quat, Vec3};

use crate::{
    BONE_RECORD_SIZE, COUNT_SIZE, HEADER_SIZE, INTERPOLATION_SIZE, MAGIC, MAGIC_SIZE,
    MODEL_NAME_SIZE, MORPH_RECORD_SIZE, NAME_SIZE,
};

/// Bone keyframe record
#[derive(Debug, Clone, PartialEq)]
pub struct BoneFrame {
    /// Raw name without padding
    pub name: Vec<u8>,
    /// Resolved bone, when the name is known
    pub bone: Option<Bone>,
    pub frame: u32,
    pub position: Vec3,
    pub rotation: Quat,
    pub interpolation: [u8; INTERPOLATION_SIZE],
}

/// Morph keyframe record
#[derive(Debug, Clone, PartialEq)]
pub struct MorphFrame {
    pub name: Vec<u8>,
    pub morph: Option<Morph>,
    pub frame: u32,
    pub weight: f32,
}

/// Parsed motion file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmdMotion {
    /// Raw model name without padding
    pub model_name: Vec<u8>,
    pub bone_frames: Vec<BoneFrame>,
    pub morph_frames: Vec<MorphFrame>,
    pub camera_count: u32,
    pub light_count: u32,
    pub shadow_count: u32,
}

/// Ensure `n` more bytes are available
fn need(buf: &[u8], n: usize, total: usize) -> AkiraResult<()> {
    if buf.remaining() < n {
        return Err(AkiraError::BufferTooShort {
            expected: total - buf.remaining() + n,
            actual: total,
        });
    }
    Ok(())
}

/// Fixed-width field with zero padding stripped
fn take_name(buf: &mut &[u8], size: usize) -> Vec<u8> {
    let field = &buf[..size];
    let end = field.iter().position(|&b| b == 0).unwrap_or(size);
    let name = field[..end].to_vec();
    buf.advance(size);
    name
}

/// Optional trailing count; older files stop before it
fn take_optional_count(buf: &mut &[u8]) -> u32 {
    if buf.remaining() >= COUNT_SIZE {
        buf.get_u32_le()
    } else {
        0
    }
}

impl VmdMotion {
    /// Parse a motion file
    pub fn parse(data: &[u8]) -> AkiraResult<Self> {
        let total = data.len();
        let mut buf = data;

        need(buf, HEADER_SIZE, total)?;
        if &buf[..MAGIC.len()] != MAGIC {
            return Err(AkiraError::InvalidMagic);
        }
        buf.advance(MAGIC_SIZE);
        let model_name = take_name(&mut buf, MODEL_NAME_SIZE);

        // Bones
        need(buf, COUNT_SIZE, total)?;
        let bone_count = buf.get_u32_le() as usize;
        need(buf, bone_count.saturating_mul(BONE_RECORD_SIZE), total)?;
        let mut bone_frames = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            let name = take_name(&mut buf, NAME_SIZE);
            let frame = buf.get_u32_le();
            let position = Vec3::new(buf.get_f32_le(), buf.get_f32_le(), buf.get_f32_le());
            let rotation = Quat::from_xyzw(
                buf.get_f32_le(),
                buf.get_f32_le(),
                buf.get_f32_le(),
                buf.get_f32_le(),
            );
            let mut interpolation = [0u8; INTERPOLATION_SIZE];
            buf.copy_to_slice(&mut interpolation);

            bone_frames.push(BoneFrame {
                bone: Bone::from_vmd_name(&name),
                name,
                frame,
                position,
                rotation,
                interpolation,
            });
        }

        // Morphs
        let morph_count = take_optional_count(&mut buf) as usize;
        need(buf, morph_count.saturating_mul(MORPH_RECORD_SIZE), total)?;
        let mut morph_frames = Vec::with_capacity(morph_count);
        for _ in 0..morph_count {
            let name = take_name(&mut buf, NAME_SIZE);
            let frame = buf.get_u32_le();
            let weight = buf.get_f32_le();
            morph_frames.push(MorphFrame {
                morph: Morph::from_vmd_name(&name),
                name,
                frame,
                weight,
            });
        }

        // Trailing sections; counts only
        let camera_count = take_optional_count(&mut buf);
        let light_count = if camera_count == 0 {
            take_optional_count(&mut buf)
        } else {
            0
        };
        let shadow_count = if camera_count == 0 && light_count == 0 {
            take_optional_count(&mut buf)
        } else {
            0
        };

        Ok(Self {
            model_name,
            bone_frames,
            morph_frames,
            camera_count,
            light_count,
            shadow_count,
        })
    }

    /// Number of distinct frame numbers across bone and morph records
    pub fn frame_count(&self) -> usize {
        self.bone_frames
            .iter()
            .map(|f| f.frame)
            .chain(self.morph_frames.iter().map(|f| f.frame))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct bones with records, by name
    pub fn bone_names(&self) -> BTreeSet<&[u8]> {
        self.bone_frames.iter().map(|f| f.name.as_slice()).collect()
    }

    /// Records of one bone, in file order
    pub fn bone_track(&self, bone: Bone) -> impl Iterator<Item = &BoneFrame> {
        self.bone_frames.iter().filter(move |f| f.bone == Some(bone))
    }

    /// Records of one morph, in file order
    pub fn morph_track(&self, morph: Morph) -> impl Iterator<Item = &MorphFrame> {
        self.morph_frames.iter().filter(move |f| f.morph == Some(morph))
    }
}
