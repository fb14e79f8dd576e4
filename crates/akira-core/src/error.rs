//! Error types for the capture pipeline

use thiserror::Error;

use crate::FrameTime;

/// Core Akira errors
///
/// Missing or occluded landmarks are never errors; they degrade to identity
/// rotations inside the engine. Everything here is either a precondition the
/// caller must fix or a malformed input that aborts the current call.
#[derive(Error, Debug)]
pub enum AkiraError {
    // Precondition errors
    #[error("No target model is bound")]
    ModelNotBound,

    #[error("Clip {clip} has no recorded keyframes")]
    EmptyClip { clip: usize },

    #[error("Clip not found: {0}")]
    ClipNotFound(usize),

    #[error("Invalid filter window size {size}: must be at least {min}")]
    InvalidWindowSize { size: usize, min: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Per-frame input errors
    #[error("Timestamps must be strictly increasing: {previous:?} then {current:?}")]
    NonMonotonicTime {
        previous: FrameTime,
        current: FrameTime,
    },

    #[error("Malformed capture input: {0}")]
    MalformedInput(String),

    #[error("Non-finite landmark in {collection} at index {index}")]
    InvalidLandmark {
        collection: &'static str,
        index: usize,
    },

    // Motion file errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Not a VMD motion file")]
    InvalidMagic,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AkiraError {
    /// Errors that only affect the frame being processed.
    ///
    /// A capture session skips the frame and keeps everything recorded so far.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            AkiraError::NonMonotonicTime { .. }
                | AkiraError::MalformedInput(_)
                | AkiraError::InvalidLandmark { .. }
        )
    }
}

/// Result type for Akira operations
pub type AkiraResult<T> = Result<T, AkiraError>;
