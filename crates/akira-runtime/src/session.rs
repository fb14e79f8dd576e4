//! Capture session
//!
//! One session per bound model. Frames are processed strictly one after the
//! other; a frame that fails is skipped and never costs the keyframes
//! recorded before it.

use std::fs;
use std::path::{Path, PathBuf};

use akira_core::{AkiraError, AkiraResult, FrameTime, HolisticFrame, HolisticResult, PoseFrame};
use akira_motion::{Clip, KeyframeRecorder};
use akira_retarget::{RetargetEngine, Skeleton};
use akira_vmd::VmdExporter;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::AkiraConfig;

/// Session counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames retargeted and recorded
    pub processed: u64,
    /// Frames dropped because of a frame-local error
    pub skipped: u64,
    /// Clips written out
    pub exported: u64,
}

/// Capture session
#[derive(Debug)]
pub struct Session {
    config: AkiraConfig,
    engine: Option<RetargetEngine>,
    recorder: KeyframeRecorder,
    exporter: VmdExporter,
    active_clip: usize,
    stats: SessionStats,
}

impl Session {
    /// Create a session without a bound model
    pub fn new(config: AkiraConfig) -> AkiraResult<Self> {
        config.validate()?;
        let exporter = VmdExporter::new(config.export)?;
        Ok(Self {
            config,
            engine: None,
            recorder: KeyframeRecorder::new(),
            exporter,
            active_clip: 0,
            stats: SessionStats::default(),
        })
    }

    pub fn config(&self) -> &AkiraConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn recorder(&self) -> &KeyframeRecorder {
        &self.recorder
    }

    pub fn is_bound(&self) -> bool {
        self.engine.is_some()
    }

    pub fn active_clip(&self) -> usize {
        self.active_clip
    }

    /// Bind a model skeleton, replacing any previous one
    ///
    /// Clips recorded against the previous model are dropped, since their
    /// keyframes carry that model's bone layout.
    pub fn bind_skeleton(&mut self, skeleton: Skeleton) -> AkiraResult<()> {
        let engine = RetargetEngine::new(
            self.config.engine.clone(),
            self.config.calibration.clone(),
            skeleton,
        )?;
        if !self.recorder.is_empty() {
            warn!(
                clips = self.recorder.clip_count(),
                "model rebound, recorded clips dropped"
            );
            self.recorder.reset();
        }
        info!(
            bones = engine.skeleton().bone_count(),
            morphs = engine.skeleton().morph_count(),
            "model bound"
        );
        self.engine = Some(engine);
        Ok(())
    }

    /// Bind a model by its bone and morph names
    pub fn bind_model<'a>(
        &mut self,
        bone_names: impl IntoIterator<Item = &'a str>,
        morph_names: impl IntoIterator<Item = &'a str>,
    ) -> AkiraResult<()> {
        self.bind_skeleton(Skeleton::from_names(bone_names, morph_names))
    }

    /// Switch to clip `index`
    ///
    /// The engine starts over from the rest pose with fresh filters, so one
    /// source's motion does not bleed into the next.
    pub fn begin_clip(&mut self, index: usize) -> AkiraResult<()> {
        let engine = self.engine.as_mut().ok_or(AkiraError::ModelNotBound)?;
        engine.reset();
        self.active_clip = index;
        debug!(clip = index, "clip started");
        Ok(())
    }

    /// Retarget and record one detector result
    ///
    /// Returns `Ok(None)` when the frame was skipped. Only a missing model
    /// is an error.
    pub fn process(
        &mut self,
        result: HolisticResult,
        time: FrameTime,
    ) -> AkiraResult<Option<PoseFrame>> {
        self.process_frame(&HolisticFrame::parse(result), time)
    }

    /// Retarget and record an already parsed frame
    pub fn process_frame(
        &mut self,
        frame: &HolisticFrame,
        time: FrameTime,
    ) -> AkiraResult<Option<PoseFrame>> {
        let engine = self.engine.as_mut().ok_or(AkiraError::ModelNotBound)?;

        match engine.update(frame, time) {
            Ok(pose) => {
                self.recorder.record(self.active_clip, &pose);
                self.stats.processed += 1;
                Ok(Some(pose))
            }
            Err(e) if e.is_frame_local() => {
                self.skip(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Count a frame that never reached the engine
    pub fn skip(&mut self, error: &AkiraError) {
        self.stats.skipped += 1;
        warn!(clip = self.active_clip, error = %error, "frame skipped");
    }

    /// Drop every recorded clip and return the engine to rest
    pub fn discard(&mut self) {
        self.recorder.reset();
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
        self.active_clip = 0;
        info!("session discarded");
    }

    /// File name of an exported clip
    pub fn file_name(&self, clip: usize) -> String {
        format!("{}_animation{}.vmd", self.config.app_name, clip)
    }

    /// Encode clip `index` as VMD
    pub fn export_clip(&self, index: usize) -> AkiraResult<Bytes> {
        if !self.is_bound() {
            return Err(AkiraError::ModelNotBound);
        }
        let clip = match self.recorder.clip(index) {
            Ok(clip) => clip,
            Err(AkiraError::ClipNotFound(clip)) => return Err(AkiraError::EmptyClip { clip }),
            Err(e) => return Err(e),
        };
        self.exporter.export(clip)
    }

    /// Write every recorded clip into `dir`, returning the written paths
    pub fn export_all(&mut self, dir: impl AsRef<Path>) -> AkiraResult<Vec<PathBuf>> {
        if !self.is_bound() {
            return Err(AkiraError::ModelNotBound);
        }
        let dir = dir.as_ref();
        let indices: Vec<usize> = self.recorder.clips().map(Clip::index).collect();
        if indices.is_empty() {
            return Err(AkiraError::EmptyClip {
                clip: self.active_clip,
            });
        }

        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(indices.len());
        for index in indices {
            let bytes = self.export_clip(index)?;
            let path = dir.join(self.file_name(index));
            fs::write(&path, &bytes)?;
            self.stats.exported += 1;
            info!(path = %path.display(), size = bytes.len(), "motion written");
            written.push(path);
        }
        Ok(written)
    }
}
