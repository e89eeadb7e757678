//! Engine configuration
//!
//! Timing and heuristic thresholds are loaded from TOML and can be
//! overridden from the environment:
//!
//! ```toml
//! [scheduler]
//! debounce_ms = 550
//! max_wait_ms = 1200
//!
//! [arbitration]
//! sentence_span_min_chars = 20
//!
//! [request]
//! locale = "en-US"
//! endpoint = "http://localhost:8000"
//! ```

use anyhow::Context;
use finding_engine::ArbitrationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_DEBOUNCE_MS: &str = "EQUALTYPE_DEBOUNCE_MS";
pub const ENV_MAX_WAIT_MS: &str = "EQUALTYPE_MAX_WAIT_MS";
pub const ENV_SENTENCE_SPAN_CHARS: &str = "EQUALTYPE_SENTENCE_SPAN_CHARS";
pub const ENV_LOCALE: &str = "EQUALTYPE_LOCALE";
pub const ENV_ENDPOINT: &str = "EQUALTYPE_ENDPOINT";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub arbitration: ArbitrationConfig,
    #[serde(default)]
    pub request: RequestConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed, or
    /// the resulting timings are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Apply `EQUALTYPE_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEBOUNCE_MS) {
            self.scheduler.debounce_ms = parse_var(ENV_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_WAIT_MS) {
            self.scheduler.max_wait_ms = parse_var(ENV_MAX_WAIT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_SENTENCE_SPAN_CHARS) {
            self.arbitration.sentence_span_min_chars = parse_var(ENV_SENTENCE_SPAN_CHARS, &value)?;
        }
        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            self.request.locale = locale;
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.request.endpoint = Some(endpoint);
        }

        self.scheduler.validate()?;
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Debounce and max-wait timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit (default: 550)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound on delay under continuous typing (default: 1200)
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Trimmed texts shorter than this are cleared instead of analyzed (default: 1)
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
}

fn default_debounce_ms() -> u64 {
    550
}

fn default_max_wait_ms() -> u64 {
    1200
}

fn default_min_text_chars() -> usize {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_wait_ms: default_max_wait_ms(),
            min_text_chars: default_min_text_chars(),
        }
    }
}

impl SchedulerConfig {
    /// Timings used by the in-page typing assist
    pub fn typing_assist() -> Self {
        Self {
            debounce_ms: 650,
            max_wait_ms: 1300,
            min_text_chars: 10,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if self.max_wait_ms <= self.debounce_ms {
            return Err(ConfigError::MaxWaitNotAboveDebounce {
                debounce_ms: self.debounce_ms,
                max_wait_ms: self.max_wait_ms,
            });
        }
        Ok(())
    }
}

/// Parameters of the outgoing analyze request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Base URL of the analysis service
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            endpoint: None,
        }
    }
}
