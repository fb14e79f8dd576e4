//! Frame time
//!
//! Detector results arrive with a video timestamp. Filters need elapsed time in
//! seconds, the recorder only needs ordering, so a single microsecond counter
//! serves both.

use serde::{Deserialize, Serialize};

/// Video time of a detector result
/// Represented as microseconds since the start of the clip
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameTime(pub i64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        FrameTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        FrameTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        FrameTime((secs * 1_000_000.0) as i64)
    }

    /// Frame `index` of a video running at `fps`
    #[inline]
    pub fn from_frame(index: u64, fps: f64) -> Self {
        Self::from_secs_f64(index as f64 / fps)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl std::fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_conversions() {
        let t = FrameTime::from_millis(1500);
        assert_eq!(t.as_micros(), 1_500_000);
        assert_eq!(t.as_millis(), 1500);
        assert!((t.as_secs_f64() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_frame() {
        let t = FrameTime::from_frame(30, 30.0);
        assert_eq!(t.as_millis(), 1000);
    }

    #[test]
    fn test_ordering() {
        assert!(FrameTime::from_millis(33) < FrameTime::from_millis(34));
        assert_eq!(FrameTime::ZERO, FrameTime::from_frame(0, 30.0));
    }

    proptest! {
        #[test]
        fn prop_frames_are_strictly_ordered(index in 0u64..10_000_000, fps in 1.0f64..240.0) {
            let a = FrameTime::from_frame(index, fps);
            let b = FrameTime::from_frame(index + 1, fps);
            prop_assert!(a < b);
            prop_assert!(b.as_micros() - a.as_micros() >= (1_000_000.0 / fps) as i64 - 1);
        }
    }
}
