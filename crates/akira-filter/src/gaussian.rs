//! Gaussian window filter
//!
//! Keeps the last N samples and convolves them with a discrete Gaussian
//! kernel. Averaging unit-ish direction vectors shortens them, so the output
//! is rescaled to the mean length of the samples in the window.

use std::collections::VecDeque;

use akira_core::{AkiraError, AkiraResult};
use glam::Vec3;

/// Smallest usable window
pub const MIN_WINDOW_SIZE: usize = 2;

/// Discrete Gaussian kernel of `size` taps centered on the middle tap.
///
/// Coefficients sum to 1.
pub fn gaussian_kernel(size: usize, sigma: f32) -> AkiraResult<Vec<f32>> {
    if size < MIN_WINDOW_SIZE {
        return Err(AkiraError::InvalidWindowSize {
            size,
            min: MIN_WINDOW_SIZE,
        });
    }

    let center = (size - 1) as f32 / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for c in &mut kernel {
            *c /= sum;
        }
    } else {
        // sigma too small to spread: all weight on the center
        kernel.iter_mut().for_each(|c| *c = 0.0);
        kernel[size / 2] = 1.0;
    }

    Ok(kernel)
}

/// Sliding window of the most recent samples, smoothed on demand
#[derive(Debug, Clone)]
pub struct GaussianVectorFilter {
    kernel: Vec<f32>,
    samples: VecDeque<Vec3>,
}

impl GaussianVectorFilter {
    /// Create a window of `size` samples
    ///
    /// Fails with `InvalidWindowSize` for windows shorter than 2.
    pub fn new(size: usize, sigma: f32) -> AkiraResult<Self> {
        let kernel = gaussian_kernel(size, sigma)?;
        Ok(Self {
            kernel,
            samples: VecDeque::with_capacity(size),
        })
    }

    /// Window capacity
    pub fn size(&self) -> usize {
        self.kernel.len()
    }

    /// True once the window holds `size` samples
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.kernel.len()
    }

    /// Append a sample, dropping the oldest beyond capacity
    pub fn push(&mut self, v: Vec3) {
        if self.samples.len() == self.kernel.len() {
            self.samples.pop_front();
        }
        self.samples.push_back(v);
    }

    /// Smoothed value of the current window
    ///
    /// Zero until the window is full.
    pub fn apply(&self) -> Vec3 {
        if !self.is_full() {
            return Vec3::ZERO;
        }

        let mut sum = Vec3::ZERO;
        let mut mean_len = 0.0;
        for (v, c) in self.samples.iter().zip(&self.kernel) {
            sum += *v * *c;
            mean_len += v.length();
        }
        mean_len /= self.samples.len() as f32;

        let len = sum.length();
        if len <= f32::EPSILON {
            return sum;
        }
        sum * (mean_len / len)
    }

    /// Push then apply
    pub fn next(&mut self, v: Vec3) -> Vec3 {
        self.push(v);
        self.apply()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
