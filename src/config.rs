//! Configuration for the `sparcify` binary.
//!
//! Values come from an optional TOML file, found via `--config` or the
//! `SPARCIFY_CONFIG` environment variable, and are then overridden by flags.
//! Profile and dataset are plain values here and are never prompted for.

use crate::batch::DEFAULT_EXTENSION;
use crate::parser::{ParseOptions, DEFAULT_SPECIMEN};
use crate::record::{check_value, Field};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "SPARCIFY_CONFIG";

pub const DEFAULT_WAREHOUSE: &str = "warehouse.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image extension the walker picks up, without the dot
    pub extension: String,
    /// Specimen for conventions whose names do not carry one
    pub default_specimen: String,
    /// Normalize across a thread pool
    pub parallel: bool,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dataset: Option<String>,
    /// Free-form label recorded with each upload
    pub profile: Option<String>,
    pub warehouse: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            default_specimen: DEFAULT_SPECIMEN.to_string(),
            parallel: false,
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            profile: None,
            warehouse: PathBuf::from(DEFAULT_WAREHOUSE),
        }
    }
}

impl Config {
    /// Load from `explicit`, else from `$SPARCIFY_CONFIG`, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_path(explicit, std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .context(format!("Invalid config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.extension.trim_start_matches('.').is_empty() {
            bail!("extension must not be empty");
        }
        check_value(Field::Specimen, &self.default_specimen)
            .context("default_specimen cannot appear in a canonical path")?;
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_specimen: self.default_specimen.clone(),
        }
    }
}

/// Explicit path wins over the environment; empty env values are ignored
fn resolve_path(explicit: Option<&Path>, env_value: Option<String>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
}
