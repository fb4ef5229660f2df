//! YAML configuration loading

use std::path::Path;

use crate::config::types::Settings;
use crate::error::{AppError, Result};

/// Load and validate settings from a YAML file.
///
/// A missing file yields defaults — every option has one — so the detector
/// can run unconfigured.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let settings = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        load_settings_from_str(&raw)?
    } else {
        tracing::info!(path = %path.display(), "No config file found, using defaults");
        Settings::default()
    };
    settings.validate()?;
    Ok(settings)
}

/// Parse and validate settings from a YAML string.
pub fn load_settings_from_str(raw: &str) -> Result<Settings> {
    let settings: Settings =
        serde_yaml::from_str(raw).map_err(|e| AppError::Config(format!("YAML parse: {}", e)))?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_str_valid() {
        let settings = load_settings_from_str("open_threshold_pct: 1.0").unwrap();
        assert_eq!(settings.open_threshold_pct, 1.0);
        assert_eq!(settings.close_threshold_pct, 0.5);
    }

    #[test]
    fn test_load_from_str_invalid_yaml() {
        let err = load_settings_from_str("open_threshold_pct: [").unwrap_err();
        assert!(err.to_string().contains("YAML parse"), "got: {}", err);
    }

    #[test]
    fn test_load_from_str_rejects_bad_threshold() {
        let err = load_settings_from_str("open_threshold_pct: -1.0").unwrap_err();
        assert!(err.to_string().contains("open_threshold_pct"), "got: {}", err);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = load_settings(Path::new("/nonexistent/spreadwatch.yaml")).unwrap();
        assert_eq!(settings.scan_interval_secs, 10);
    }
}
