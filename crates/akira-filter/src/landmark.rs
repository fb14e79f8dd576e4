//! Visibility-gated landmark filter
//!
//! The unit the engine keeps one of per signal source: a main filter, an
//! optional Gaussian stage, and a visibility gate in front of both.

use akira_core::AkiraResult;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{GaussianVectorFilter, KalmanVectorFilter, OneEuroFilter};

/// Window length of the optional Gaussian stage
pub const GAUSSIAN_STAGE_SIZE: usize = 5;

/// Samples at or below this visibility are ignored
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.6;

/// Main filter selection and tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterParams {
    OneEuro {
        min_cutoff: f32,
        beta: f32,
        d_cutoff: f32,
    },
    Kalman {
        process_noise: f32,
        measurement_noise: f32,
    },
}

impl FilterParams {
    pub fn one_euro(min_cutoff: f32, beta: f32) -> Self {
        FilterParams::OneEuro {
            min_cutoff,
            beta,
            d_cutoff: 1.0,
        }
    }

    pub fn kalman() -> Self {
        FilterParams::Kalman {
            process_noise: crate::DEFAULT_PROCESS_NOISE,
            measurement_noise: crate::DEFAULT_MEASUREMENT_NOISE,
        }
    }

    /// Check tuning values are usable
    pub fn is_valid(&self) -> bool {
        match *self {
            FilterParams::OneEuro {
                min_cutoff,
                beta,
                d_cutoff,
            } => min_cutoff > 0.0 && beta >= 0.0 && d_cutoff > 0.0,
            FilterParams::Kalman {
                process_noise,
                measurement_noise,
            } => process_noise >= 0.0 && measurement_noise > 0.0,
        }
    }
}

/// Filter settings for one signal source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkFilterConfig {
    pub filter: FilterParams,
    /// Sigma of the trailing Gaussian stage, `None` to disable it
    pub gaussian_sigma: Option<f32>,
    pub visibility_threshold: f32,
}

impl Default for LandmarkFilterConfig {
    fn default() -> Self {
        Self {
            filter: FilterParams::one_euro(1.0, 0.4),
            gaussian_sigma: None,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
enum MainFilter {
    OneEuro(OneEuroFilter),
    Kalman(KalmanVectorFilter),
}

/// Filtered position of one landmark (or derived point)
#[derive(Debug, Clone)]
pub struct FilteredLandmark {
    main: MainFilter,
    gaussian: Option<GaussianVectorFilter>,
    visibility_threshold: f32,
    position: Option<Vec3>,
}

impl FilteredLandmark {
    pub fn new(config: &LandmarkFilterConfig) -> AkiraResult<Self> {
        let main = match config.filter {
            FilterParams::OneEuro {
                min_cutoff,
                beta,
                d_cutoff,
            } => MainFilter::OneEuro(OneEuroFilter::with_derivative_cutoff(
                min_cutoff, beta, d_cutoff,
            )),
            FilterParams::Kalman {
                process_noise,
                measurement_noise,
            } => MainFilter::Kalman(KalmanVectorFilter::new(process_noise, measurement_noise)),
        };

        let gaussian = match config.gaussian_sigma {
            Some(sigma) => Some(GaussianVectorFilter::new(GAUSSIAN_STAGE_SIZE, sigma)?),
            None => None,
        };

        Ok(Self {
            main,
            gaussian,
            visibility_threshold: config.visibility_threshold,
            position: None,
        })
    }

    /// Offer a sample taken at `t` seconds
    ///
    /// Returns the filtered position, or the last accepted one when the sample
    /// is not visible enough. `None` until a sample has been accepted.
    /// Samples without a visibility score are always accepted.
    pub fn update(&mut self, t: f64, point: Vec3, visibility: Option<f32>) -> Option<Vec3> {
        if let Some(v) = visibility {
            if v <= self.visibility_threshold {
                trace!(visibility = v, "landmark below visibility threshold, holding");
                return self.position;
            }
        }

        let filtered = match &mut self.main {
            MainFilter::OneEuro(f) => f.next(t, point),
            MainFilter::Kalman(f) => f.next(point),
        };

        let out = match &mut self.gaussian {
            Some(g) => {
                g.push(filtered);
                if g.is_full() {
                    g.apply()
                } else {
                    filtered
                }
            }
            None => filtered,
        };

        self.position = Some(out);
        self.position
    }

    /// Last accepted position
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    pub fn reset(&mut self) {
        match &mut self.main {
            MainFilter::OneEuro(f) => f.reset(),
            MainFilter::Kalman(f) => f.reset(),
        }
        if let Some(g) = &mut self.gaussian {
            g.reset();
        }
        self.position = None;
    }
}
