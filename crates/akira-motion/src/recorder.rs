//! Keyframe recorder

use std::collections::BTreeMap;

use akira_core::{AkiraError, AkiraResult, PoseFrame};
use tracing::debug;

use crate::{Clip, Keyframe};

/// Append-only keyframe log grouped by clip index
#[derive(Debug, Clone, Default)]
pub struct KeyframeRecorder {
    clips: BTreeMap<usize, Clip>,
}

impl KeyframeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pose into clip `clip`, creating the clip on first use
    pub fn record(&mut self, clip: usize, pose: &PoseFrame) -> &Keyframe {
        let entry = self.clips.entry(clip).or_insert_with(|| {
            debug!(clip, "clip created");
            Clip::new(clip)
        });
        entry.push(pose)
    }

    /// Clip by index
    pub fn clip(&self, index: usize) -> AkiraResult<&Clip> {
        self.clips.get(&index).ok_or(AkiraError::ClipNotFound(index))
    }

    /// All clips in index order
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Keyframes across all clips
    pub fn keyframe_count(&self) -> usize {
        self.clips.values().map(Clip::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Drop every clip
    pub fn reset(&mut self) {
        let dropped = self.keyframe_count();
        self.clips.clear();
        debug!(dropped, "recorder reset");
    }
}
