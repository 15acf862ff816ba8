// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::errors::Result;

/// Load an engine configuration from a path without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: EngineConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load an engine configuration from path and validate it.
///
/// Missing keys fall back to [`EngineConfig::default`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let config = load_from_path(path)?;
    config.validate()?;
    Ok(config)
}

/// `Jobengine.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Jobengine.toml")
}

impl EngineConfig {
    /// Parse and validate a configuration held in memory.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}
