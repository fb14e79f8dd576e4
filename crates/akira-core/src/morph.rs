//! Morphs - facial expression weights driven by the face solver

use serde::{Deserialize, Serialize};

/// Facial morph identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Morph {
    /// Left eye blink
    Blink,
    /// Right eye blink
    BlinkRight,
    Surprise,
    Anger,
    Worry,
    Disgust,
    /// Viseme "a"
    A,
    /// Viseme "i"
    I,
    /// Viseme "u"
    U,
    /// Viseme "e"
    E,
    /// Viseme "o"
    O,
}

/// (model name, Shift_JIS motion file name), indexed by `Morph as usize`
const MORPH_NAMES: [(&str, &[u8]); Morph::COUNT] = [
    ("まばたき", b"\x82\xDC\x82\xCE\x82\xBD\x82\xAB"),
    ("まばたき右", b"\x82\xDC\x82\xCE\x82\xBD\x82\xAB\x89\x45"),
    ("驚き", b"\x8B\xC1\x82\xAB"),
    ("怒り", b"\x93\x7B\x82\xE8"),
    ("困る", b"\x8D\xA2\x82\xE9"),
    ("嫌悪", b"\x8C\x99\x88\xAB"),
    ("あ", b"\x82\xA0"),
    ("い", b"\x82\xA2"),
    ("う", b"\x82\xA4"),
    ("え", b"\x82\xA6"),
    ("お", b"\x82\xA8"),
];

impl Morph {
    pub const COUNT: usize = 11;

    pub const ALL: [Morph; Morph::COUNT] = [
        Morph::Blink,
        Morph::BlinkRight,
        Morph::Surprise,
        Morph::Anger,
        Morph::Worry,
        Morph::Disgust,
        Morph::A,
        Morph::I,
        Morph::U,
        Morph::E,
        Morph::O,
    ];

    /// Viseme morphs
    pub const VISEMES: [Morph; 5] = [Morph::A, Morph::I, Morph::U, Morph::E, Morph::O];

    /// Name of the morph in the model
    #[inline]
    pub fn name(self) -> &'static str {
        MORPH_NAMES[self as usize].0
    }

    /// Shift_JIS encoded name as written in motion files
    #[inline]
    pub fn vmd_name(self) -> &'static [u8] {
        MORPH_NAMES[self as usize].1
    }

    pub fn from_name(name: &str) -> Option<Morph> {
        Morph::ALL.iter().copied().find(|m| m.name() == name)
    }

    pub fn from_vmd_name(raw: &[u8]) -> Option<Morph> {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let raw = &raw[..end];
        Morph::ALL.iter().copied().find(|m| m.vmd_name() == raw)
    }

    #[inline]
    pub fn is_viseme(self) -> bool {
        Morph::VISEMES.contains(&self)
    }
}

impl std::fmt::Display for Morph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
