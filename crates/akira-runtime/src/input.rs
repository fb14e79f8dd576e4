//! Capture and model input files
//!
//! Captures are JSON lines, one detector result per line:
//!
//! ```json
//! {"time": 0.033, "clip": 0, "poseWorldLandmarks": [[{"x": 0.1, "y": -0.5, "z": 0.0, "visibility": 0.9}]]}
//! ```
//!
//! `time` is the video time in seconds; without it the line number and the
//! capture frame rate stand in. `clip` defaults to 0.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use akira_core::{AkiraError, AkiraResult, FrameTime, HolisticResult};
use akira_retarget::Skeleton;
use serde::{Deserialize, Serialize};

/// One line of a capture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureRecord {
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub clip: usize,
    #[serde(flatten)]
    pub result: HolisticResult,
}

impl CaptureRecord {
    /// Video time, falling back to `frame / fps`
    pub fn frame_time(&self, frame: u64, fps: f64) -> FrameTime {
        match self.time {
            Some(secs) => FrameTime::from_secs_f64(secs),
            None => FrameTime::from_frame(frame, fps),
        }
    }
}

/// Iterator over the records of a capture stream
///
/// Blank lines are skipped. Each malformed line yields its own error so
/// callers can skip it and go on.
pub struct CaptureReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> CaptureReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Line number of the last record read (1-based)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for CaptureReader<R> {
    type Item = AkiraResult<CaptureRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|e| {
                AkiraError::MalformedInput(format!("line {}: {}", self.line, e))
            }));
        }
    }
}

/// Bone and morph names of a loaded model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDescription {
    pub name: String,
    pub bones: Vec<String>,
    pub morphs: Vec<String>,
}

impl ModelDescription {
    pub fn from_json(json: &str) -> AkiraResult<Self> {
        serde_json::from_str(json).map_err(|e| AkiraError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> AkiraResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Skeleton of the known bones and morphs; unknown names are ignored
    pub fn skeleton(&self) -> Skeleton {
        Skeleton::from_names(
            self.bones.iter().map(String::as_str),
            self.morphs.iter().map(String::as_str),
        )
    }
}
