//! VMD file layout
//!
//! All integers and floats are little-endian.
//!
//! Header is 50 bytes:
//! - Bytes 0-29: Magic, zero padded
//! - Bytes 30-49: Model name (Shift_JIS, zero padded)
//!
//! Then a u32 bone record count and the bone records (111 bytes each):
//! - Bytes 0-14: Bone name (Shift_JIS, zero padded)
//! - Bytes 15-18: Frame number
//! - Bytes 19-30: Position x, y, z
//! - Bytes 31-46: Rotation x, y, z, w
//! - Bytes 47-110: Interpolation curves
//!
//! Then a u32 morph record count and the morph records (23 bytes each):
//! - Bytes 0-14: Morph name
//! - Bytes 15-18: Frame number
//! - Bytes 19-22: Weight
//!
//! The file ends with the camera, light and shadow record counts.

/// File signature
pub const MAGIC: &[u8] = b"Vocaloid Motion Data 0002";

/// Magic field size
pub const MAGIC_SIZE: usize = 30;

/// Model name field size
pub const MODEL_NAME_SIZE: usize = 20;

/// Header size (magic + model name)
pub const HEADER_SIZE: usize = MAGIC_SIZE + MODEL_NAME_SIZE;

/// Bone and morph name field size
pub const NAME_SIZE: usize = 15;

/// Interpolation block size per bone record
pub const INTERPOLATION_SIZE: usize = 64;

/// Bone record size
pub const BONE_RECORD_SIZE: usize = NAME_SIZE + 4 + 12 + 16 + INTERPOLATION_SIZE;

/// Morph record size
pub const MORPH_RECORD_SIZE: usize = NAME_SIZE + 4 + 4;

/// Record count field size
pub const COUNT_SIZE: usize = 4;

/// Trailing section counts (camera, light, shadow)
pub const TRAILING_SECTIONS: usize = 3;

/// Linear interpolation byte
pub const LINEAR_INTERPOLATION: u8 = 20;

/// Exact size of an encoded file
pub fn encoded_size(bone_records: usize, morph_records: usize) -> usize {
    HEADER_SIZE
        + COUNT_SIZE
        + bone_records * BONE_RECORD_SIZE
        + COUNT_SIZE
        + morph_records * MORPH_RECORD_SIZE
        + TRAILING_SECTIONS * COUNT_SIZE
}
