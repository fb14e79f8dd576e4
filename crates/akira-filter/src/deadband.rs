//! Euclidean deadband
//!
//! Holds a value and only replaces it when a new sample moves far enough.
//! Used where micro-jitter would otherwise flicker a binary-looking output.

use glam::Vec3;

/// Replaces the held value only when a sample moves beyond `threshold`
#[derive(Debug, Clone)]
pub struct EuclideanHighPass {
    threshold: f32,
    value: Vec3,
}

impl EuclideanHighPass {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            value: Vec3::ZERO,
        }
    }

    /// Offer a sample; returns the (possibly unchanged) held value
    pub fn update(&mut self, sample: Vec3) -> Vec3 {
        if self.value.distance(sample) > self.threshold {
            self.value = sample;
        }
        self.value
    }

    /// Scalar convenience for one-channel signals
    pub fn update_scalar(&mut self, sample: f32) -> f32 {
        self.update(Vec3::new(sample, 0.0, 0.0)).x
    }

    pub fn value(&self) -> Vec3 {
        self.value
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.value = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_changes_are_held() {
        let mut d = EuclideanHighPass::new(0.1);
        assert_eq!(d.update(Vec3::new(0.05, 0.0, 0.0)), Vec3::ZERO);
        assert_eq!(d.update(Vec3::new(0.5, 0.0, 0.0)), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(d.update(Vec3::new(0.55, 0.0, 0.0)), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_scalar() {
        let mut d = EuclideanHighPass::new(0.1);
        assert_eq!(d.update_scalar(0.09), 0.0);
        assert_eq!(d.update_scalar(1.0), 1.0);
        d.reset();
        assert_eq!(d.value(), Vec3::ZERO);
    }

    proptest! {
        #[test]
        fn prop_idempotent(
            x in -2.0f32..2.0,
            y in -2.0f32..2.0,
            z in -2.0f32..2.0,
            threshold in 0.0f32..1.0,
        ) {
            let mut d = EuclideanHighPass::new(threshold);
            let v = Vec3::new(x, y, z);
            let first = d.update(v);
            let second = d.update(v);
            prop_assert_eq!(first, second);
        }
    }
}
