//! Akira Motion - Recorded keyframes
//!
//! Every processed frame becomes an immutable [`Keyframe`] appended to the
//! active [`Clip`]. Clips are append-only; the only way to drop recorded
//! data is a full [`KeyframeRecorder::reset`].

pub mod keyframe;
pub mod recorder;

pub use keyframe::*;
pub use recorder::*;
