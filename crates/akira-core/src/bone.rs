//! Bones - the fixed skeleton schema
//!
//! The target rig is an MMD model. Every bone the engine can drive is listed
//! here once, together with its model name and the Shift_JIS bytes the motion
//! file uses for it, so the engine and the exporter can never disagree on a name.

use serde::{Deserialize, Serialize};

/// Body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// +1 for left, -1 for right; mirrors x components of reference vectors
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Finger identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Number of driven joints (the thumb has two, other fingers three)
    #[inline]
    pub fn joint_count(self) -> usize {
        match self {
            Finger::Thumb => 2,
            _ => 3,
        }
    }

    /// Offset of the finger's first joint inside [`Bone::fingers`]
    #[inline]
    fn offset(self) -> usize {
        match self {
            Finger::Thumb => 0,
            Finger::Index => 2,
            Finger::Middle => 5,
            Finger::Ring => 8,
            Finger::Pinky => 11,
        }
    }
}

/// Skeleton bone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bone {
    // Trunk
    Root,
    LowerBody,
    UpperBody,
    Neck,
    Head,

    // Arms
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWristTwist,
    RightWristTwist,
    LeftWrist,
    RightWrist,

    // Legs
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftFootIk,
    RightFootIk,

    // Eyes
    LeftEye,
    RightEye,

    // Left fingers
    LeftThumb1,
    LeftThumb2,
    LeftIndex1,
    LeftIndex2,
    LeftIndex3,
    LeftMiddle1,
    LeftMiddle2,
    LeftMiddle3,
    LeftRing1,
    LeftRing2,
    LeftRing3,
    LeftPinky1,
    LeftPinky2,
    LeftPinky3,

    // Right fingers
    RightThumb1,
    RightThumb2,
    RightIndex1,
    RightIndex2,
    RightIndex3,
    RightMiddle1,
    RightMiddle2,
    RightMiddle3,
    RightRing1,
    RightRing2,
    RightRing3,
    RightPinky1,
    RightPinky2,
    RightPinky3,
}

/// Finger joints per hand
pub const FINGER_JOINTS_PER_HAND: usize = 14;

/// (model name, Shift_JIS motion file name), indexed by `Bone as usize`
const BONE_NAMES: [(&str, &[u8]); Bone::COUNT] = [
    ("全ての親", b"\x91\x53\x82\xC4\x82\xCC\x90\x65"),
    ("下半身", b"\x89\xBA\x94\xBC\x90\x67"),
    ("上半身", b"\x8F\xE3\x94\xBC\x90\x67"),
    ("首", b"\x8E\xF1"),
    ("頭", b"\x93\xAA"),
    ("左腕", b"\x8D\xB6\x98\x72"),
    ("右腕", b"\x89\x45\x98\x72"),
    ("左ひじ", b"\x8D\xB6\x82\xD0\x82\xB6"),
    ("右ひじ", b"\x89\x45\x82\xD0\x82\xB6"),
    ("左手捩", b"\x8D\xB6\x8E\xE8\x9D\x80"),
    ("右手捩", b"\x89\x45\x8E\xE8\x9D\x80"),
    ("左手首", b"\x8D\xB6\x8E\xE8\x8E\xF1"),
    ("右手首", b"\x89\x45\x8E\xE8\x8E\xF1"),
    ("左足", b"\x8D\xB6\x91\xAB"),
    ("右足", b"\x89\x45\x91\xAB"),
    ("左ひざ", b"\x8D\xB6\x82\xD0\x82\xB4"),
    ("右ひざ", b"\x89\x45\x82\xD0\x82\xB4"),
    ("左足首", b"\x8D\xB6\x91\xAB\x8E\xF1"),
    ("右足首", b"\x89\x45\x91\xAB\x8E\xF1"),
    ("左足ＩＫ", b"\x8D\xB6\x91\xAB\x82\x68\x82\x6A"),
    ("右足ＩＫ", b"\x89\x45\x91\xAB\x82\x68\x82\x6A"),
    ("左目", b"\x8D\xB6\x96\xDA"),
    ("右目", b"\x89\x45\x96\xDA"),
    ("左親指１", b"\x8D\xB6\x90\x65\x8E\x77\x82\x50"),
    ("左親指２", b"\x8D\xB6\x90\x65\x8E\x77\x82\x51"),
    ("左人指１", b"\x8D\xB6\x90\x6C\x8E\x77\x82\x50"),
    ("左人指２", b"\x8D\xB6\x90\x6C\x8E\x77\x82\x51"),
    ("左人指３", b"\x8D\xB6\x90\x6C\x8E\x77\x82\x52"),
    ("左中指１", b"\x8D\xB6\x92\x86\x8E\x77\x82\x50"),
    ("左中指２", b"\x8D\xB6\x92\x86\x8E\x77\x82\x51"),
    ("左中指３", b"\x8D\xB6\x92\x86\x8E\x77\x82\x52"),
    ("左薬指１", b"\x8D\xB6\x96\xF2\x8E\x77\x82\x50"),
    ("左薬指２", b"\x8D\xB6\x96\xF2\x8E\x77\x82\x51"),
    ("左薬指３", b"\x8D\xB6\x96\xF2\x8E\x77\x82\x52"),
    ("左小指１", b"\x8D\xB6\x8F\xAC\x8E\x77\x82\x50"),
    ("左小指２", b"\x8D\xB6\x8F\xAC\x8E\x77\x82\x51"),
    ("左小指３", b"\x8D\xB6\x8F\xAC\x8E\x77\x82\x52"),
    ("右親指１", b"\x89\x45\x90\x65\x8E\x77\x82\x50"),
    ("右親指２", b"\x89\x45\x90\x65\x8E\x77\x82\x51"),
    ("右人指１", b"\x89\x45\x90\x6C\x8E\x77\x82\x50"),
    ("右人指２", b"\x89\x45\x90\x6C\x8E\x77\x82\x51"),
    ("右人指３", b"\x89\x45\x90\x6C\x8E\x77\x82\x52"),
    ("右中指１", b"\x89\x45\x92\x86\x8E\x77\x82\x50"),
    ("右中指２", b"\x89\x45\x92\x86\x8E\x77\x82\x51"),
    ("右中指３", b"\x89\x45\x92\x86\x8E\x77\x82\x52"),
    ("右薬指１", b"\x89\x45\x96\xF2\x8E\x77\x82\x50"),
    ("右薬指２", b"\x89\x45\x96\xF2\x8E\x77\x82\x51"),
    ("右薬指３", b"\x89\x45\x96\xF2\x8E\x77\x82\x52"),
    ("右小指１", b"\x89\x45\x8F\xAC\x8E\x77\x82\x50"),
    ("右小指２", b"\x89\x45\x8F\xAC\x8E\x77\x82\x51"),
    ("右小指３", b"\x89\x45\x8F\xAC\x8E\x77\x82\x52"),
];

impl Bone {
    /// Number of bones in the schema
    pub const COUNT: usize = 51;

    /// All bones in skeleton order
    pub const ALL: [Bone; Bone::COUNT] = [
        Bone::Root,
        Bone::LowerBody,
        Bone::UpperBody,
        Bone::Neck,
        Bone::Head,
        Bone::LeftShoulder,
        Bone::RightShoulder,
        Bone::LeftElbow,
        Bone::RightElbow,
        Bone::LeftWristTwist,
        Bone::RightWristTwist,
        Bone::LeftWrist,
        Bone::RightWrist,
        Bone::LeftHip,
        Bone::RightHip,
        Bone::LeftKnee,
        Bone::RightKnee,
        Bone::LeftAnkle,
        Bone::RightAnkle,
        Bone::LeftFootIk,
        Bone::RightFootIk,
        Bone::LeftEye,
        Bone::RightEye,
        Bone::LeftThumb1,
        Bone::LeftThumb2,
        Bone::LeftIndex1,
        Bone::LeftIndex2,
        Bone::LeftIndex3,
        Bone::LeftMiddle1,
        Bone::LeftMiddle2,
        Bone::LeftMiddle3,
        Bone::LeftRing1,
        Bone::LeftRing2,
        Bone::LeftRing3,
        Bone::LeftPinky1,
        Bone::LeftPinky2,
        Bone::LeftPinky3,
        Bone::RightThumb1,
        Bone::RightThumb2,
        Bone::RightIndex1,
        Bone::RightIndex2,
        Bone::RightIndex3,
        Bone::RightMiddle1,
        Bone::RightMiddle2,
        Bone::RightMiddle3,
        Bone::RightRing1,
        Bone::RightRing2,
        Bone::RightRing3,
        Bone::RightPinky1,
        Bone::RightPinky2,
        Bone::RightPinky3,
    ];

    /// Name of the bone in the model
    #[inline]
    pub fn name(self) -> &'static str {
        BONE_NAMES[self as usize].0
    }

    /// Shift_JIS encoded name as written in motion files
    #[inline]
    pub fn vmd_name(self) -> &'static [u8] {
        BONE_NAMES[self as usize].1
    }

    /// Look up a bone by its model name
    pub fn from_name(name: &str) -> Option<Bone> {
        Bone::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Look up a bone by its motion file name (trailing zero padding ignored)
    pub fn from_vmd_name(raw: &[u8]) -> Option<Bone> {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let raw = &raw[..end];
        Bone::ALL.iter().copied().find(|b| b.vmd_name() == raw)
    }

    /// Bones whose position is meaningful (translation driven)
    #[inline]
    pub fn is_positional(self) -> bool {
        matches!(self, Bone::Root | Bone::LeftFootIk | Bone::RightFootIk)
    }

    /// Side of the body, if the bone is lateral
    pub fn side(self) -> Option<Side> {
        match self {
            Bone::Root | Bone::LowerBody | Bone::UpperBody | Bone::Neck | Bone::Head => None,
            b if b.name().starts_with('左') => Some(Side::Left),
            _ => Some(Side::Right),
        }
    }

    pub fn shoulder(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftShoulder,
            Side::Right => Bone::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftElbow,
            Side::Right => Bone::RightElbow,
        }
    }

    pub fn wrist_twist(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftWristTwist,
            Side::Right => Bone::RightWristTwist,
        }
    }

    pub fn wrist(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftWrist,
            Side::Right => Bone::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftHip,
            Side::Right => Bone::RightHip,
        }
    }

    pub fn knee(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftKnee,
            Side::Right => Bone::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftAnkle,
            Side::Right => Bone::RightAnkle,
        }
    }

    pub fn foot_ik(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftFootIk,
            Side::Right => Bone::RightFootIk,
        }
    }

    pub fn eye(side: Side) -> Bone {
        match side {
            Side::Left => Bone::LeftEye,
            Side::Right => Bone::RightEye,
        }
    }

    /// The 14 finger joints of one hand
    ///
    /// Order: thumb 1-2, index 1-3, middle 1-3, ring 1-3, pinky 1-3.
    pub fn fingers(side: Side) -> &'static [Bone] {
        let start = match side {
            Side::Left => Bone::LeftThumb1 as usize,
            Side::Right => Bone::RightThumb1 as usize,
        };
        &Bone::ALL[start..start + FINGER_JOINTS_PER_HAND]
    }

    /// Joint `joint` (0-based, proximal first) of a finger
    pub fn finger(side: Side, finger: Finger, joint: usize) -> Option<Bone> {
        if joint >= finger.joint_count() {
            return None;
        }
        Some(Bone::fingers(side)[finger.offset() + joint])
    }
}

impl std::fmt::Display for Bone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_matches_enum_order() {
        for (i, bone) in Bone::ALL.iter().enumerate() {
            assert_eq!(*bone as usize, i, "{:?} out of order", bone);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for bone in Bone::ALL {
            assert_eq!(Bone::from_name(bone.name()), Some(bone));
            assert_eq!(Bone::from_vmd_name(bone.vmd_name()), Some(bone));
        }
        assert_eq!(Bone::from_name("しっぽ"), None);
    }

    #[test]
    fn test_vmd_names_fit_field() {
        for bone in Bone::ALL {
            assert!(bone.vmd_name().len() <= 15, "{} too long", bone);
            assert!(!bone.vmd_name().contains(&0));
        }
    }

    #[test]
    fn test_vmd_name_padding_ignored() {
        let mut padded = [0u8; 15];
        let name = Bone::LeftFootIk.vmd_name();
        padded[..name.len()].copy_from_slice(name);
        assert_eq!(Bone::from_vmd_name(&padded), Some(Bone::LeftFootIk));
    }

    #[test]
    fn test_known_encoding() {
        // 首
        assert_eq!(Bone::Neck.vmd_name(), &[0x8E, 0xF1]);
        assert_eq!(Bone::UpperBody.name(), "上半身");
    }

    #[test]
    fn test_finger_layout() {
        assert_eq!(Bone::fingers(Side::Left).len(), FINGER_JOINTS_PER_HAND);
        assert_eq!(Bone::fingers(Side::Right)[0], Bone::RightThumb1);
        assert_eq!(Bone::finger(Side::Left, Finger::Ring, 2), Some(Bone::LeftRing3));
        assert_eq!(Bone::finger(Side::Right, Finger::Thumb, 1), Some(Bone::RightThumb2));
        assert_eq!(Bone::finger(Side::Right, Finger::Thumb, 2), None);
        assert_eq!(
            Finger::ALL.iter().map(|f| f.joint_count()).sum::<usize>(),
            FINGER_JOINTS_PER_HAND
        );
    }

    #[test]
    fn test_sides() {
        assert_eq!(Bone::Root.side(), None);
        assert_eq!(Bone::LeftFootIk.side(), Some(Side::Left));
        assert_eq!(Bone::RightPinky3.side(), Some(Side::Right));
        for side in Side::BOTH {
            assert!(Bone::fingers(side).iter().all(|b| b.side() == Some(side)));
        }
    }

    #[test]
    fn test_positional_bones() {
        let positional: Vec<Bone> = Bone::ALL.iter().copied().filter(|b| b.is_positional()).collect();
        assert_eq!(positional, vec![Bone::Root, Bone::LeftFootIk, Bone::RightFootIk]);
    }

    proptest! {
        #[test]
        fn prop_padded_vmd_name_resolves(i in 0usize..Bone::COUNT, tail in proptest::collection::vec(any::<u8>(), 0..8)) {
            let bone = Bone::ALL[i];
            let mut field = [0u8; 15];
            field[..bone.vmd_name().len()].copy_from_slice(bone.vmd_name());
            // Bytes after the first zero are garbage in real files
            let start = bone.vmd_name().len() + 1;
            for (slot, b) in field.iter_mut().skip(start).zip(&tail) {
                *slot = *b;
            }
            prop_assert_eq!(Bone::from_vmd_name(&field), Some(bone));
        }

        #[test]
        fn prop_lookup_matches_name(raw in proptest::collection::vec(any::<u8>(), 0..20)) {
            if let Some(bone) = Bone::from_vmd_name(&raw) {
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                prop_assert_eq!(bone.vmd_name(), &raw[..end]);
            }
        }
    }
}
