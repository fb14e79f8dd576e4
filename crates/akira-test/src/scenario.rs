//! End-to-end capture scenarios
//!
//! A scenario plays a synthetic performer through detector noise into a
//! session, then exports the recorded clip.

use akira_core::{AkiraResult, FrameTime, PoseFrame};
use akira_retarget::Skeleton;
use akira_runtime::{AkiraConfig, Session};
use akira_vmd::VmdExporter;
use bytes::Bytes;

use crate::{DetectorChaos, DetectorNoise, PerformerPose, SyntheticPerformer};

/// Capture scenario
#[derive(Debug, Clone)]
pub struct Scenario {
    pub performer: SyntheticPerformer,
    pub frames: u64,
    pub noise: DetectorNoise,
    pub seed: u64,
    pub config: AkiraConfig,
    pub skeleton: Skeleton,
}

/// What came out of a scenario run
#[derive(Debug)]
pub struct ScenarioReport {
    pub processed: u64,
    pub skipped: u64,
    /// Frames the noise corrupted on purpose
    pub corrupted: u64,
    /// Engine output of every processed frame
    pub poses: Vec<PoseFrame>,
    /// Ground truth of every frame, processed or not
    pub truth: Vec<PerformerPose>,
    /// Keyframe indices the exporter kept
    pub selected: Vec<usize>,
    /// Exported clip
    pub vmd: Bytes,
    pub session: Session,
}

impl Scenario {
    pub fn new(performer: SyntheticPerformer, frames: u64) -> Self {
        Self {
            performer,
            frames,
            noise: DetectorNoise::clean(),
            seed: 0,
            config: AkiraConfig::default(),
            skeleton: Skeleton::full(),
        }
    }

    pub fn with_noise(mut self, noise: DetectorNoise, seed: u64) -> Self {
        self.noise = noise;
        self.seed = seed;
        self
    }

    pub fn with_skeleton(mut self, skeleton: Skeleton) -> Self {
        self.skeleton = skeleton;
        self
    }

    /// Run the capture and export clip 0
    pub fn run(&self) -> AkiraResult<ScenarioReport> {
        let mut session = Session::new(self.config.clone())?;
        session.bind_skeleton(self.skeleton.clone())?;
        session.begin_clip(0)?;

        let mut chaos = DetectorChaos::new(self.noise.clone(), self.seed);
        let mut poses = Vec::with_capacity(self.frames as usize);
        let mut truth = Vec::with_capacity(self.frames as usize);

        for i in 0..self.frames {
            let mut result = self.performer.frame(i);
            chaos.apply(&mut result);
            truth.push(self.performer.pose(i));

            let time = FrameTime::from_frame(i, self.performer.fps);
            if let Some(pose) = session.process(result, time)? {
                poses.push(pose);
            }
        }

        let exporter = VmdExporter::new(self.config.export)?;
        let selected = exporter.select(session.recorder().clip(0)?);
        let vmd = session.export_clip(0)?;

        Ok(ScenarioReport {
            processed: session.stats().processed,
            skipped: session.stats().skipped,
            corrupted: chaos.corrupted(),
            poses,
            truth,
            selected,
            vmd,
            session,
        })
    }
}
