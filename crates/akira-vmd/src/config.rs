//! Export configuration

use akira_core::{AkiraError, AkiraResult, Bone};
use serde::{Deserialize, Serialize};

use crate::LINEAR_INTERPOLATION;

/// Export configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Upper bound on exported frames per clip
    pub frame_cap: usize,
    /// Per-component difference below which two frames are the same
    pub similarity_threshold: f32,
    /// Morph weights use `similarity_threshold * morph_threshold_factor`
    pub morph_threshold_factor: f32,
    /// Byte filling every interpolation block
    pub interpolation: u8,
    /// Keep shoulder positions as well as root and foot IK
    pub positional_shoulders: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            frame_cap: 3000,
            similarity_threshold: 0.003,
            morph_threshold_factor: 10.0,
            interpolation: LINEAR_INTERPOLATION,
            positional_shoulders: true,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> AkiraResult<()> {
        if self.frame_cap < 2 {
            return Err(AkiraError::InvalidConfig(format!(
                "export.frame_cap must be at least 2, got {}",
                self.frame_cap
            )));
        }
        if !(self.similarity_threshold >= 0.0) {
            return Err(AkiraError::InvalidConfig(format!(
                "export.similarity_threshold must be non-negative, got {}",
                self.similarity_threshold
            )));
        }
        if !(self.morph_threshold_factor >= 0.0) {
            return Err(AkiraError::InvalidConfig(format!(
                "export.morph_threshold_factor must be non-negative, got {}",
                self.morph_threshold_factor
            )));
        }
        Ok(())
    }

    /// Morph weight similarity threshold
    #[inline]
    pub fn morph_threshold(&self) -> f32 {
        self.similarity_threshold * self.morph_threshold_factor
    }

    /// Whether `bone` keeps its position in the file
    pub fn keeps_position(&self, bone: Bone) -> bool {
        bone.is_positional()
            || (self.positional_shoulders
                && matches!(bone, Bone::LeftShoulder | Bone::RightShoulder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.morph_threshold() - 0.03).abs() < 1e-6);
        assert!(config.keeps_position(Bone::Root));
        assert!(config.keeps_position(Bone::LeftFootIk));
        assert!(config.keeps_position(Bone::RightShoulder));
        assert!(!config.keeps_position(Bone::Head));
    }

    #[test]
    fn test_shoulders_can_be_rotation_only() {
        let config = ExportConfig {
            positional_shoulders: false,
            ..Default::default()
        };
        assert!(!config.keeps_position(Bone::LeftShoulder));
        assert!(config.keeps_position(Bone::RightFootIk));
    }

    #[test]
    fn test_invalid_values() {
        for config in [
            ExportConfig {
                frame_cap: 1,
                ..Default::default()
            },
            ExportConfig {
                similarity_threshold: f32::NAN,
                ..Default::default()
            },
            ExportConfig {
                morph_threshold_factor: -1.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(AkiraError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_partial_json() {
        let config: ExportConfig = serde_json::from_str(r#"{ "frame_cap": 600 }"#).unwrap();
        assert_eq!(config.frame_cap, 600);
        assert_eq!(config.interpolation, LINEAR_INTERPOLATION);
    }
}
