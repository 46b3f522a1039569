//! Configuration management for effectprobe
//!
//! Handles loading and validation of `effectprobe.toml` files. Every section
//! and key is optional and falls back to its default.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//! log_format = "json"
//!
//! [covering]
//! seed = 7
//! max_resamples = 50000
//!
//! [domain]
//! samples = 9
//!
//! [plan]
//! strategy = "constrained"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::covering::CoveringConfig;
use crate::domain::DomainConfig;
use crate::error::{ConfigError, Result};
use crate::plan::{PlanConfig, PlanOptions};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Pairwise builder settings
    #[serde(default)]
    pub covering: CoveringConfig,

    /// Candidate generation settings
    #[serde(default)]
    pub domain: DomainConfig,

    /// Plan settings
    #[serde(default)]
    pub plan: PlanConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-friendly output for interactive use
    #[default]
    Pretty,
    /// JSON lines for CI and log collectors
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s}. Expected one of: pretty, json")),
        }
    }
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (pretty, json)
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the builders cannot work with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.domain.samples < 2 {
            return Err(ConfigError::Invalid {
                field: "domain.samples",
                reason: format!("must be at least 2, got {}", self.domain.samples),
            });
        }
        if self.domain.range_samples < 2 {
            return Err(ConfigError::Invalid {
                field: "domain.range_samples",
                reason: format!("must be at least 2, got {}", self.domain.range_samples),
            });
        }
        if self.covering.max_resamples == 0 {
            return Err(ConfigError::Invalid {
                field: "covering.max_resamples",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Planning inputs with an empty baseline
    #[must_use]
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            strategy: self.plan.strategy,
            covering: self.covering,
            ..PlanOptions::default()
        }
    }
}
