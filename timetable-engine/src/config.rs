//! Engine configuration and its JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::{BindConfig, InterpolationConfig};
use crate::diagnostics::DiagnosticsConfig;
use crate::interval::IntervalFilter;

/// Errors loading, saving or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid configuration JSON
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Values parse but do not make sense together
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Every configuration snapshot the engine consumes.
///
/// Missing sections and fields take their defaults, so an empty JSON object
/// is a valid file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub binding: BindConfig,
    pub interpolation: InterpolationConfig,
    pub interval: IntervalFilter,
    pub diagnostics: DiagnosticsConfig,
}

impl EngineConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };
        if self.interpolation.precision_secs < 1 {
            return invalid("interpolation.precision_secs must be at least 1");
        }
        let d = &self.diagnostics;
        if d.dwell_warning_secs < 0 || d.run_warning_secs < 0 {
            return invalid("diagnostics thresholds must not be negative");
        }
        if d.dwell_warning_secs > d.dwell_error_secs {
            return invalid("diagnostics.dwell_warning_secs exceeds dwell_error_secs");
        }
        if d.run_warning_secs > d.run_error_secs {
            return invalid("diagnostics.run_warning_secs exceeds run_error_secs");
        }
        Ok(())
    }
}

/// A configuration file on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the configuration.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        debug!(path = %self.path.display(), "loaded config");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file gives the defaults.
    pub fn load_or_default(&self) -> Result<EngineConfig, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(EngineConfig::default());
        }
        self.load()
    }

    /// Write the configuration as pretty JSON.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_config() {
        let dir = tempdir().unwrap();
        let file = ConfigFile::new(dir.path().join("engine.json"));

        let mut config = EngineConfig::default();
        config.binding.max_passed_stations = Some(4);
        config.interval.stop_only = true;
        config.diagnostics.report_meets = true;
        file.save(&config).unwrap();

        assert_eq!(file.load().unwrap(), config);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"interval": {"business_only": true}}"#).unwrap();

        let config = ConfigFile::new(&path).load().unwrap();
        assert!(config.interval.business_only);
        assert!(!config.interval.stop_only);
        assert_eq!(config.binding, BindConfig::default());
    }

    #[test]
    fn missing_file() {
        let file = ConfigFile::new("/nonexistent/path/engine.json");
        assert!(matches!(file.load(), Err(ConfigError::Io { .. })));
        assert_eq!(file.load_or_default().unwrap(), EngineConfig::default());
    }

    #[test]
    fn malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ConfigFile::new(&path).load(),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn inconsistent_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.diagnostics.dwell_warning_secs = config.diagnostics.dwell_error_secs + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let dir = tempdir().unwrap();
        let file = ConfigFile::new(dir.path().join("engine.json"));
        assert!(file.save(&config).is_err());
        assert!(!file.path().exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.json");
        ConfigFile::new(&path).save(&EngineConfig::default()).unwrap();
        assert!(path.exists());
    }
}
