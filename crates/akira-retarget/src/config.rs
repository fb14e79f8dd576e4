//! Engine configuration
//!
//! Every tuned constant of the solvers lives here so a capture setup can be
//! adjusted from a config file without touching the solvers.

use std::f32::consts::PI;

use akira_core::{AkiraError, AkiraResult, Finger};
use akira_filter::{FilterParams, LandmarkFilterConfig, DEFAULT_VISIBILITY_THRESHOLD};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Filter settings per landmark group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterTuning {
    /// Shoulders and hips driving the upper/lower body
    pub torso: LandmarkFilterConfig,
    /// Shoulder, elbow and wrist of each arm
    pub arms: LandmarkFilterConfig,
    /// Hip, knee and ankle of each leg
    pub legs: LandmarkFilterConfig,
    /// Image-space hips and shoulders driving root translation
    pub screen: LandmarkFilterConfig,
}

impl Default for FilterTuning {
    fn default() -> Self {
        let gated = |filter| LandmarkFilterConfig {
            filter,
            gaussian_sigma: None,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        };
        Self {
            // Stability over responsiveness for the trunk
            torso: gated(FilterParams::one_euro(1.5, 0.8)),
            arms: gated(FilterParams::kalman()),
            legs: gated(FilterParams::one_euro(1.0, 0.4)),
            screen: gated(FilterParams::one_euro(1.5, 0.8)),
        }
    }
}

/// Coupling of distal finger joints to the proximal bend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerConfig {
    pub thumb: [f32; 1],
    pub index: [f32; 2],
    pub middle: [f32; 2],
    pub ring: [f32; 2],
    pub pinky: [f32; 2],
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            thumb: [0.85],
            index: [0.9, 0.65],
            middle: [0.9, 0.65],
            ring: [0.9, 0.65],
            pinky: [0.85, 0.55],
        }
    }
}

impl FingerConfig {
    /// Ratios for the joints after the proximal one
    pub fn ratios(&self, finger: Finger) -> &[f32] {
        match finger {
            Finger::Thumb => &self.thumb,
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Ring => &self.ring,
            Finger::Pinky => &self.pinky,
        }
    }
}

/// Iris-driven eye rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeGazeConfig {
    pub enabled: bool,
    /// Radians per unit of scaled iris offset
    pub sensitivity: f32,
    /// Yaw and pitch are clamped to ±this
    pub max_angle: f32,
    /// Scale applied to face mesh points before measuring offsets
    pub point_scale: Vec3,
}

impl Default for EyeGazeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: 0.3,
            max_angle: PI / 9.0,
            point_scale: Vec3::new(10.0, 10.0, 5.0),
        }
    }
}

/// Foot IK target placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootIkConfig {
    pub scale: f32,
    pub y_offset: f32,
}

impl Default for FootIkConfig {
    fn default() -> Self {
        Self {
            scale: 10.0,
            y_offset: 7.0,
        }
    }
}

/// Root translation from image-space hips and shoulders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootMotionConfig {
    /// Damping of horizontal displacement
    pub damping: f32,
    /// Image x treated as the stage center
    pub center_x: f32,
    /// Model units per unit of damped horizontal displacement
    pub x_scale: f32,
    /// Model units per unit of depth proxy
    pub z_scale: f32,
    /// Ceiling for the root position lerp factor
    pub max_smoothing: f32,
}

impl Default for RootMotionConfig {
    fn default() -> Self {
        Self {
            damping: 0.7,
            center_x: 0.4,
            x_scale: 25.0,
            z_scale: 0.8,
            max_smoothing: 0.2,
        }
    }
}

/// Facial expression thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Eye closure threshold as a fraction of eye-to-eye width
    pub blink_ratio: f32,
    /// Blink targets must move this far before the morph follows
    pub blink_deadband: f32,
    /// Normalized mouth height at which the mouth counts as closed
    pub mouth_closed: f32,
    /// Normalized mouth height range from closed to fully open
    pub mouth_open_range: f32,
    /// Normalized mouth width of a neutral mouth
    pub mouth_neutral_width: f32,
    /// Normalized mouth width range from neutral to fully stretched
    pub mouth_stretch_range: f32,
    /// Corner lift giving a full smile
    pub smile_lift: f32,
    /// Drive the a/i/u/e/o visemes
    pub visemes: bool,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            blink_ratio: 0.08,
            blink_deadband: 0.1,
            mouth_closed: 0.02,
            mouth_open_range: 0.08,
            mouth_neutral_width: 0.28,
            mouth_stretch_range: 0.06,
            smile_lift: 0.03,
            visemes: true,
        }
    }
}

/// Anatomical clamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanLimits {
    /// Foot yaw range in radians
    pub foot_yaw: [f32; 2],
}

impl Default for HumanLimits {
    fn default() -> Self {
        Self {
            foot_yaw: [-0.4, 0.4],
        }
    }
}

/// Retargeting engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of the remaining distance every bone write covers
    pub lerp_factor: f32,
    pub filters: FilterTuning,
    pub fingers: FingerConfig,
    pub eye_gaze: EyeGazeConfig,
    pub foot_ik: FootIkConfig,
    pub root: RootMotionConfig,
    pub expression: ExpressionConfig,
    pub limits: HumanLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lerp_factor: 0.3,
            filters: FilterTuning::default(),
            fingers: FingerConfig::default(),
            eye_gaze: EyeGazeConfig::default(),
            foot_ik: FootIkConfig::default(),
            root: RootMotionConfig::default(),
            expression: ExpressionConfig::default(),
            limits: HumanLimits::default(),
        }
    }
}

fn in_unit_interval(name: &str, value: f32) -> AkiraResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(AkiraError::InvalidConfig(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}

fn positive(name: &str, value: f32) -> AkiraResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(AkiraError::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

impl EngineConfig {
    /// Root position lerp factor
    pub fn root_smoothing(&self) -> f32 {
        self.lerp_factor.min(self.root.max_smoothing)
    }

    pub fn validate(&self) -> AkiraResult<()> {
        in_unit_interval("lerp_factor", self.lerp_factor)?;
        in_unit_interval("root.max_smoothing", self.root.max_smoothing)?;

        let groups = [
            ("filters.torso", &self.filters.torso),
            ("filters.arms", &self.filters.arms),
            ("filters.legs", &self.filters.legs),
            ("filters.screen", &self.filters.screen),
        ];
        for (name, group) in groups {
            if !group.filter.is_valid() {
                return Err(AkiraError::InvalidConfig(format!(
                    "{}: invalid filter parameters {:?}",
                    name, group.filter
                )));
            }
            if let Some(sigma) = group.gaussian_sigma {
                positive(&format!("{}.gaussian_sigma", name), sigma)?;
            }
        }

        positive("eye_gaze.max_angle", self.eye_gaze.max_angle)?;
        positive("expression.blink_ratio", self.expression.blink_ratio)?;
        positive("expression.mouth_open_range", self.expression.mouth_open_range)?;
        positive(
            "expression.mouth_stretch_range",
            self.expression.mouth_stretch_range,
        )?;
        positive("expression.smile_lift", self.expression.smile_lift)?;

        let [lo, hi] = self.limits.foot_yaw;
        if lo > hi {
            return Err(AkiraError::InvalidConfig(format!(
                "limits.foot_yaw is empty: [{}, {}]",
                lo, hi
            )));
        }
        Ok(())
    }
}
