//! FILENAME: core/persistence/src/settings.rs
//! Metric settings file (`{"monthOffset": 4, "trendStride": 8}`).

use std::fs;
use std::path::Path;

use engine::MetricSettings;
use report_engine::log_debug;

use crate::PersistenceError;

/// Loads metric settings. A missing file yields the defaults; missing keys
/// take their default values.
pub fn load_settings(path: impl AsRef<Path>) -> Result<MetricSettings, PersistenceError> {
    let path = path.as_ref();
    if !path.exists() {
        log_debug!("SETTINGS", "{} not found, using defaults", path.display());
        return Ok(MetricSettings::default());
    }

    let settings: MetricSettings = serde_json::from_str(&fs::read_to_string(path)?)?;
    if settings.trend_stride == 0 {
        return Err(PersistenceError::InvalidFormat("trendStride must be at least 1".to_string()));
    }
    Ok(settings)
}

pub fn save_settings(path: impl AsRef<Path>, settings: &MetricSettings) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, MetricSettings::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "monthOffset": 3 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.month_offset, 3);
        assert_eq!(settings.trend_stride, 1);
        assert_eq!(settings.trend_limit, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("settings.json");
        let settings = MetricSettings {
            month_offset: 4,
            trend_stride: 8,
            trend_limit: Some(26),
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_zero_stride_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "trendStride": 0 }"#).unwrap();
        assert!(matches!(load_settings(&path), Err(PersistenceError::InvalidFormat(_))));
    }
}
