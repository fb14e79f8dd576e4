//! Akira Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the capture pipeline:
//! - Landmarks and the per-frame detector result parser
//! - The closed bone and morph enumerations with their VMD name tables
//! - Pose frames produced by the retargeting engine
//! - Frame time and the error type

pub mod bone;
pub mod error;
pub mod holistic;
pub mod landmark;
pub mod morph;
pub mod pose;
pub mod time;

pub use bone::*;
pub use error::*;
pub use holistic::*;
pub use landmark::*;
pub use morph::*;
pub use pose::*;
pub use time::*;
