//! Configuration loading and parsing

use anyhow::{Context, Result};
use secs_log_decoder::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalyzerConfig,
    #[serde(default)]
    pub codes: CodesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Code-table override files, merged over the built-in tables in order
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CodesConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Include the normalized event table next to the summary
    #[serde(default)]
    pub include_events: bool,
    #[serde(default)]
    pub pretty: bool,
    /// Write JSON here instead of stdout
    pub output_file: Option<PathBuf>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .analysis
        .validate()
        .with_context(|| format!("Invalid [analysis] section in {:?}", path))?;

    Ok(config)
}
