//! Application configuration
//!
//! A single JSON document; every field is optional and falls back to the
//! tuned defaults.
//!
//! ```json
//! {
//!   "app_name": "akira",
//!   "engine": { "lerp_factor": 0.3 },
//!   "export": { "frame_cap": 3000 }
//! }
//! ```

use std::fs;
use std::path::Path;

use akira_core::{AkiraError, AkiraResult};
use akira_retarget::{CalibrationProfile, EngineConfig};
use akira_vmd::ExportConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default application name, used in exported file names
pub const DEFAULT_APP_NAME: &str = "akira";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AkiraConfig {
    pub app_name: String,
    pub engine: EngineConfig,
    pub calibration: CalibrationProfile,
    pub export: ExportConfig,
}

impl Default for AkiraConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            engine: EngineConfig::default(),
            calibration: CalibrationProfile::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AkiraConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> AkiraResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AkiraError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> AkiraResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> AkiraResult<()> {
        if self.app_name.is_empty()
            || self
                .app_name
                .contains(|c: char| c == '/' || c == '\\' || c.is_control())
        {
            return Err(AkiraError::InvalidConfig(format!(
                "app_name is not usable in a file name: {:?}",
                self.app_name
            )));
        }
        self.engine.validate()?;
        self.calibration.validate()?;
        self.export.validate()
    }

    pub fn to_json(&self) -> AkiraResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AkiraError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = AkiraConfig::from_json("{}").unwrap();
        assert_eq!(config, AkiraConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AkiraConfig::from_json(
            r#"{ "app_name": "studio", "engine": { "lerp_factor": 0.5 }, "export": { "frame_cap": 100 } }"#,
        )
        .unwrap();
        assert_eq!(config.app_name, "studio");
        assert_eq!(config.engine.lerp_factor, 0.5);
        assert_eq!(config.export.frame_cap, 100);
        assert_eq!(config.export.similarity_threshold, 0.003);
    }

    #[test]
    fn test_round_trip_json() {
        let config = AkiraConfig::default();
        let parsed = AkiraConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            AkiraConfig::from_json(r#"{ "engine": { "lerp_factor": 0.0 } }"#),
            Err(AkiraError::InvalidConfig(_))
        ));
        assert!(matches!(
            AkiraConfig::from_json(r#"{ "app_name": "a/b" }"#),
            Err(AkiraError::InvalidConfig(_))
        ));
        assert!(matches!(
            AkiraConfig::from_json("not json"),
            Err(AkiraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AkiraConfig::load("/nonexistent/akira.json"),
            Err(AkiraError::Io(_))
        ));
    }
}
