//! Akira Test Harness - Synthetic captures and pipeline validation
//!
//! This crate provides:
//! - A synthetic performer producing detector results with known ground truth
//! - Detector noise: jitter, occlusion, lost hands and faces, corrupt frames
//! - End-to-end scenarios running captures through a session and export

pub mod noise;
pub mod performer;
pub mod scenario;

pub use noise::*;
pub use performer::*;
pub use scenario::*;
