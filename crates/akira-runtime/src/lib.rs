//! Akira Runtime - Capture sessions
//!
//! A [`Session`] ties the pipeline together for one bound model:
//! 1. Parse the detector result
//! 2. Retarget it onto the skeleton
//! 3. Record the pose into the active clip
//! 4. Export clips as VMD files on request
//!
//! The `akira` binary drives sessions from JSON-lines capture files.

pub mod config;
pub mod input;
pub mod session;

pub use config::*;
pub use input::*;
pub use session::*;
