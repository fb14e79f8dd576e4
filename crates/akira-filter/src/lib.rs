//! Akira Filters - Landmark jitter reduction
//!
//! Detector output shakes from frame to frame even when the performer holds
//! still. These filters run on raw 3D points before they become rotations:
//! - OneEuro: adaptive low-pass, smooth at rest and responsive in motion
//! - Kalman: per-axis recursive estimator
//! - Gaussian: windowed convolution over the last N samples
//! - Deadband: ignores changes below a distance threshold
//!
//! Every filter instance belongs to exactly one signal source. Sharing one
//! between unrelated points breaks the continuity its state assumes.

pub mod deadband;
pub mod gaussian;
pub mod kalman;
pub mod landmark;
pub mod one_euro;

pub use deadband::*;
pub use gaussian::*;
pub use kalman::*;
pub use landmark::*;
pub use one_euro::*;
