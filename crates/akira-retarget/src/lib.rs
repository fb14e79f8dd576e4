//! Akira Retarget - Landmarks in, bone rotations out
//!
//! Each frame the engine filters the raw detector points, derives a target
//! rotation for every driven bone in dependency order (torso, head, arms,
//! legs, fingers), moves the root and the foot IK targets, and updates the
//! facial morphs. Targets are never applied directly: every write is a
//! damped step from the bone's current state.
//!
//! The solvers are plain functions over points and parent rotations, so they
//! can be tested without an engine.

pub mod arm;
pub mod body;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod face;
pub mod finger;
pub mod leg;
pub mod math;
pub mod signal;
pub mod skeleton;
pub mod translation;

pub use arm::*;
pub use body::*;
pub use calibration::*;
pub use config::*;
pub use engine::*;
pub use face::*;
pub use finger::*;
pub use leg::*;
pub use signal::*;
pub use skeleton::*;
pub use translation::*;
