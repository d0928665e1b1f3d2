//! Registration configuration with TOML file support.

use livegate_classifier::DEFAULT_MIN_MODEL_CONFIDENCE;
use livegate_modules::{FaceConfig, TouchConfig, VoiceConfig};
use livegate_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<livegate_modules::ConfigError> for ConfigError {
    fn from(e: livegate_modules::ConfigError) -> Self {
        match e {
            livegate_modules::ConfigError::Invalid { field, reason } => Self::Invalid { field, reason },
        }
    }
}

/// Classifier selection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model results below this confidence fall back to the heuristic.
    #[serde(default = "default_min_model_confidence")]
    pub min_model_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_model_confidence: default_min_model_confidence(),
        }
    }
}

/// Configuration for a registration session.
///
/// Can be loaded from a TOML file via [`RegistrationConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Module tick period.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How often a running skippable module checks for a skip request.
    #[serde(default = "default_skip_poll_interval_ms")]
    pub skip_poll_interval_ms: u64,

    /// Requested credential lifetime.
    #[serde(default = "default_credential_validity_days")]
    pub credential_validity_days: u32,

    /// Key store id used to sign the package.
    #[serde(default = "default_key_id")]
    pub key_id: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub face: FaceConfig,

    #[serde(default)]
    pub voice: VoiceConfig,

    #[serde(default)]
    pub touch: TouchConfig,
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_skip_poll_interval_ms() -> u64 {
    100
}

fn default_credential_validity_days() -> u32 {
    365
}

fn default_key_id() -> String {
    "registration".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_model_confidence() -> f64 {
    DEFAULT_MIN_MODEL_CONFIDENCE
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RegistrationConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be positive"));
        }
        if self.skip_poll_interval_ms == 0 {
            return Err(invalid("skip_poll_interval_ms", "must be positive"));
        }
        if self.credential_validity_days == 0 {
            return Err(invalid("credential_validity_days", "must be positive"));
        }
        if self.key_id.is_empty() {
            return Err(invalid("key_id", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.classifier.min_model_confidence) {
            return Err(invalid("classifier.min_model_confidence", "must be in [0, 1]"));
        }
        self.face.validate()?;
        self.voice.validate()?;
        self.touch.validate()?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn skip_poll_interval(&self) -> Duration {
        Duration::from_millis(self.skip_poll_interval_ms)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            skip_poll_interval_ms: default_skip_poll_interval_ms(),
            credential_validity_days: default_credential_validity_days(),
            key_id: default_key_id(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            classifier: ClassifierConfig::default(),
            face: FaceConfig::default(),
            voice: VoiceConfig::default(),
            touch: TouchConfig::default(),
        }
    }
}
