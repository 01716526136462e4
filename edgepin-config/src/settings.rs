//! Optional tool settings read from `~/.config/edgepin/config.yaml`.
//!
//! Every field has a default, so a missing file is not an error. Command-line
//! flags are applied on top by the binary.

use crate::error::SettingsError;
use crate::store::{DEFAULT_STORE_FILENAME, STORE_PATH_ENV};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const SETTINGS_PATH_ENV: &str = "EDGEPIN_CONFIG_PATH";

/// Lambda@Edge functions are always published in us-east-1.
pub const DEFAULT_LAMBDA_REGION: &str = "us-east-1";

/// Upper bound on a single provider call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Log verbosity for the stderr log bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse a level name as accepted in `RUST_LOG` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stage store file; falls back to `EDGEPIN_STORE_PATH`, then `image_flex_config.json`
    pub store_path: Option<PathBuf>,

    /// Named AWS profile from the shared config and credentials files
    pub profile: Option<String>,

    /// Region for CloudFront calls (CloudFront is global; usually left unset)
    pub cloudfront_region: Option<String>,

    /// Region the edge functions are published in
    pub lambda_region: String,

    /// Per-operation timeout in seconds
    pub timeout_secs: u64,

    /// Log level used when neither `--log-level` nor `RUST_LOG` is set
    pub log_level: Option<LogLevel>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: None,
            profile: None,
            cloudfront_region: None,
            lambda_region: DEFAULT_LAMBDA_REGION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

impl Settings {
    /// Load from the default location, or defaults when no file exists there.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::settings_path())
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        log::info!("Loading settings from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file deserializes to unit, not a mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings =
            serde_yaml_ng::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every provider call fail.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_secs == 0 {
            return Err(SettingsError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.lambda_region.trim().is_empty() {
            return Err(SettingsError::Validation(
                "lambda_region must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved store path: settings value, then `EDGEPIN_STORE_PATH`, then the default name.
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match std::env::var(STORE_PATH_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_STORE_FILENAME),
        }
    }

    /// Get the settings file path (using XDG convention)
    pub fn settings_path() -> PathBuf {
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("edgepin")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("edgepin")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
