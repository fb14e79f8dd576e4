//! One Euro Filter - adaptive low-pass filter for 3D points
//!
//! Smooth when slow (reduces jitter), responsive when fast (tracks limbs).
//! The cutoff frequency of the position signal rises with the magnitude of the
//! smoothed velocity.

use std::f32::consts::PI;

use glam::Vec3;

/// Adaptive low-pass filter over 3D samples
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f32,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f32,

    // State
    x_prev: Vec3,
    dx_prev: Vec3,
    t_prev: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self::with_derivative_cutoff(min_cutoff, beta, 1.0)
    }

    pub fn with_derivative_cutoff(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            x_prev: Vec3::ZERO,
            dx_prev: Vec3::ZERO,
            t_prev: 0.0,
            initialized: false,
        }
    }

    /// Calculate smoothing factor alpha
    fn smoothing_factor(t_e: f32, cutoff: f32) -> f32 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    fn exponential_smoothing(a: f32, x: Vec3, x_prev: Vec3) -> Vec3 {
        x * a + x_prev * (1.0 - a)
    }

    /// Filter one sample
    ///
    /// - `t`: timestamp in seconds, strictly increasing between calls
    /// - `x`: raw sample
    ///
    /// The first sample passes through unchanged and seeds the state. A sample
    /// whose timestamp does not advance carries no rate information; the
    /// previous output is returned and the state is left untouched.
    pub fn next(&mut self, t: f64, x: Vec3) -> Vec3 {
        if !self.initialized {
            self.x_prev = x;
            self.dx_prev = Vec3::ZERO;
            self.t_prev = t;
            self.initialized = true;
            return x;
        }

        let t_e = (t - self.t_prev) as f32;
        if t_e <= 0.0 {
            return self.x_prev;
        }

        // 1. Estimate derivative (velocity)
        let a_d = Self::smoothing_factor(t_e, self.d_cutoff);
        let dx = (x - self.x_prev) / t_e;
        let dx_hat = Self::exponential_smoothing(a_d, dx, self.dx_prev);

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.min_cutoff + self.beta * dx_hat.length();
        let a = Self::smoothing_factor(t_e, cutoff);

        // 3. Apply filter
        let x_hat = Self::exponential_smoothing(a, x, self.x_prev);

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        self.t_prev = t;

        x_hat
    }

    /// Last filtered sample (zero before the first sample)
    pub fn value(&self) -> Vec3 {
        self.x_prev
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.x_prev = Vec3::ZERO;
        self.dx_prev = Vec3::ZERO;
        self.t_prev = 0.0;
        self.initialized = false;
    }
}
