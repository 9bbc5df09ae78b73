//! Configuration system for RandoForge.
//!
//! Load randomizer configuration from TOML or YAML files to control the
//! seed, retry behavior and placement strategy without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use randoforge_config::RandomizerConfig;
//!
//! let config = RandomizerConfig::from_toml_str(r#"
//!     seed = 42
//!     attempt_limit = 500
//!
//!     [placement]
//!     strategy = "uniform"
//! "#).unwrap();
//!
//! assert_eq!(config.seed, 42);
//! assert_eq!(config.attempt_limit, Some(500));
//! ```
//!
//! Use the default config when no file is present:
//!
//! ```
//! use randoforge_config::RandomizerConfig;
//!
//! let config = RandomizerConfig::load("randomizer.toml").unwrap_or_default();
//! assert_eq!(config.seed, 0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Placement strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Uniform choice among unfilled earlier-sphere locations.
    #[default]
    Uniform,
}

/// Placement section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub strategy: StrategyKind,
}

/// Top-level randomizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizerConfig {
    /// RNG seed; identical inputs and seed reproduce the run exactly.
    pub seed: u64,

    /// Retry bound for recoverable exhaustion. `None` retries indefinitely,
    /// relying on the caller's timeout.
    pub attempt_limit: Option<u32>,

    pub placement: PlacementConfig,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        RandomizerConfig {
            seed: 0,
            attempt_limit: None,
            placement: PlacementConfig::default(),
        }
    }
}

impl RandomizerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Loads by extension: `.yaml`/`.yml` parse as YAML, everything else as
    /// TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_attempt_limit(mut self, limit: u32) -> Self {
        self.attempt_limit = Some(limit);
        self
    }
}
