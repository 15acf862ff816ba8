// src/config/validate.rs

use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};

impl EngineConfig {
    /// Semantic checks that deserialisation cannot express.
    pub fn validate(&self) -> Result<()> {
        validate_workers(self)?;
        validate_backoff(self)?;
        Ok(())
    }
}

fn validate_workers(cfg: &EngineConfig) -> Result<()> {
    if cfg.workers == 0 {
        return Err(EngineError::ConfigError(
            "workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_backoff(cfg: &EngineConfig) -> Result<()> {
    if cfg.backoff.initial_ms == 0 {
        return Err(EngineError::ConfigError(
            "[backoff].initial_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.backoff.initial_ms > cfg.backoff.max_ms {
        return Err(EngineError::ConfigError(format!(
            "[backoff].initial_ms ({}) must not exceed [backoff].max_ms ({})",
            cfg.backoff.initial_ms, cfg.backoff.max_ms
        )));
    }

    Ok(())
}
