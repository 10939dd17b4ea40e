//! Analysis Configuration - sampling rate, data location and report settings
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a missing config file changes nothing.
//!
//! Loading only parses. Range checks run through [`HeliTuneConfig::validate`]
//! once the command-line overrides are in place.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeliTuneConfig {
    /// Serial output settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Where rig logs live
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl HeliTuneConfig {
    /// Load configuration using the standard search order:
    /// 1. `explicit` path (from `--config`)
    /// 2. `$HELI_TUNE_CONFIG` environment variable
    /// 3. `./heli_tune.toml` in the current working directory
    /// 4. Built-in defaults
    ///
    /// An explicit path that fails to load is an error; the implicit
    /// locations fall back with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. --config
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok(config);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 3. ./heli_tune.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        // 4. Defaults
        info!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse TOML text.
    ///
    /// Unknown keys are logged as warnings; they never fail the load. Values
    /// are not range-checked here.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))
    }

    /// Validate physical ranges; suspicious values are logged, impossible ones fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_physical_ranges(self);
        for w in &warnings {
            warn!(field = %w.field, "{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

/// Serial output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AcquisitionConfig {
    /// Samples per second of the logged readings
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate_hz: f64,
}

fn default_sampling_rate() -> f64 {
    defaults::SAMPLING_RATE_HZ
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: default_sampling_rate(),
        }
    }
}

/// Log file location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for logs
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// Extension of log files (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}
fn default_extension() -> String {
    defaults::LOG_EXTENSION.to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            extension: default_extension(),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    /// Most recent sessions reported per file
    #[serde(default = "default_last_sessions")]
    pub last_sessions: usize,
}

fn default_last_sessions() -> usize {
    defaults::LAST_SESSIONS
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            last_sessions: default_last_sessions(),
        }
    }
}
