//! Kalman filtering for landmark coordinates
//!
//! A constant-state model per axis: the estimate is expected to stay where it
//! is, process noise lets it drift, measurement noise says how much to trust
//! each new reading.

use glam::Vec3;

/// Default process noise
pub const DEFAULT_PROCESS_NOISE: f32 = 0.1;
/// Default measurement noise
pub const DEFAULT_MEASUREMENT_NOISE: f32 = 3.0;

/// One-dimensional Kalman filter
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    /// Process noise (R)
    process_noise: f32,
    /// Measurement noise (Q)
    measurement_noise: f32,

    x: f32,
    cov: f32,
    initialized: bool,
}

impl ScalarKalman {
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            process_noise,
            measurement_noise,
            x: 0.0,
            cov: 0.0,
            initialized: false,
        }
    }

    /// Fold one measurement into the estimate
    pub fn filter(&mut self, z: f32) -> f32 {
        if !self.initialized {
            self.x = z;
            self.cov = self.measurement_noise;
            self.initialized = true;
            return self.x;
        }

        // Predict
        let pred_cov = self.cov + self.process_noise;

        // Update
        let gain = pred_cov / (pred_cov + self.measurement_noise);
        self.x += gain * (z - self.x);
        self.cov = pred_cov - gain * pred_cov;

        self.x
    }

    /// Current estimate
    pub fn estimate(&self) -> f32 {
        self.x
    }

    /// Current error covariance
    pub fn covariance(&self) -> f32 {
        self.cov
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
        self.cov = 0.0;
        self.initialized = false;
    }
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE)
    }
}

/// Three independent scalar filters, one per axis
#[derive(Debug, Clone, Default)]
pub struct KalmanVectorFilter {
    axes: [ScalarKalman; 3],
}

impl KalmanVectorFilter {
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        let axis = ScalarKalman::new(process_noise, measurement_noise);
        Self {
            axes: [axis.clone(), axis.clone(), axis],
        }
    }

    pub fn next(&mut self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.axes[0].filter(v.x),
            self.axes[1].filter(v.y),
            self.axes[2].filter(v.z),
        )
    }

    pub fn value(&self) -> Vec3 {
        Vec3::new(
            self.axes[0].estimate(),
            self.axes[1].estimate(),
            self.axes[2].estimate(),
        )
    }

    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_measurement_seeds_estimate() {
        let mut k = ScalarKalman::default();
        assert_eq!(k.filter(2.5), 2.5);
        assert_eq!(k.covariance(), DEFAULT_MEASUREMENT_NOISE);
    }

    #[test]
    fn test_update_step() {
        let mut k = ScalarKalman::new(0.1, 3.0);
        k.filter(0.0);
        let out = k.filter(1.0);
        // pred_cov = 3.1, gain = 3.1 / 6.1
        let gain = 3.1 / 6.1;
        assert!((out - gain).abs() < 1e-6);
        assert!((k.covariance() - (3.1 - gain * 3.1)).abs() < 1e-6);
    }

    #[test]
    fn test_covariance_settles() {
        let mut k = ScalarKalman::default();
        let mut prev = f32::MAX;
        for _ in 0..50 {
            k.filter(1.0);
            assert!(k.covariance() <= prev);
            prev = k.covariance();
        }
        assert!((k.estimate() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vector_filter_axes_are_independent() {
        let mut f = KalmanVectorFilter::default();
        f.next(Vec3::ZERO);
        let out = f.next(Vec3::new(1.0, 0.0, -1.0));
        assert!(out.x > 0.0 && out.x < 1.0);
        assert_eq!(out.y, 0.0);
        assert!((out.z + out.x).abs() < 1e-6);
        assert_eq!(f.value(), out);
    }

    #[test]
    fn test_reset() {
        let mut f = KalmanVectorFilter::default();
        f.next(Vec3::ONE);
        f.next(Vec3::ZERO);
        f.reset();
        assert_eq!(f.next(Vec3::X), Vec3::X);
    }

    proptest! {
        #[test]
        fn prop_estimate_stays_within_measurements(
            samples in proptest::collection::vec(-5.0f32..5.0, 1..40)
        ) {
            let mut k = ScalarKalman::default();
            let lo = samples.iter().cloned().fold(f32::MAX, f32::min);
            let hi = samples.iter().cloned().fold(f32::MIN, f32::max);
            for z in samples {
                let x = k.filter(z);
                prop_assert!(x >= lo - 1e-4 && x <= hi + 1e-4);
            }
        }
    }
}
