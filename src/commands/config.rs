//! Application configuration
//!
//! Read from an optional JSON file; every field has a default so a partial
//! file (or none at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::midi::SpeedLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Accepted speed factor range and default factor
    pub speed: SpeedLimits,
    /// Append log lines to a file as well as stderr
    pub log_to_file: bool,
    /// Log file override, defaults to `~/.tempo-scale/logs/tempo-scale.log`
    pub log_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            speed: SpeedLimits::default(),
            log_to_file: false,
            log_path: None,
        }
    }
}

impl AppConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_json(&contents).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: AppConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.speed.check_consistent()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_speed_section() {
        let config = AppConfig::from_json(r#"{"speed": {"max": 2.0}, "logToFile": true}"#).unwrap();
        assert_eq!(config.speed.min, 0.1);
        assert_eq!(config.speed.max, 2.0);
        assert_eq!(config.speed.default, 1.0);
        assert!(config.log_to_file);
    }

    #[test]
    fn test_inconsistent_limits_rejected() {
        let err = AppConfig::from_json(r#"{"speed": {"min": 2.0, "max": 1.0, "default": 1.5}}"#).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn test_limits_cannot_widen_range() {
        let err = AppConfig::from_json(r#"{"speed": {"max": 4.0}}"#).unwrap_err();
        assert!(err.contains("above 3"));
        let err = AppConfig::from_json(r#"{"speed": {"min": 0.001, "max": 100.0}}"#).unwrap_err();
        assert!(err.contains("below 0.1"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(AppConfig::from_json("{speed:").is_err());
    }
}
