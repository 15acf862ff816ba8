// src/config/mod.rs

//! Engine configuration.
//!
//! - [`EngineConfig`] is the validated, typed configuration.
//! - [`loader`] reads TOML from disk or strings.
//! - [`validate`] performs semantic checks on top of deserialisation.
//!
//! Example:
//!
//! ```toml
//! workers = 4
//! log_level = "debug"
//!
//! [backoff]
//! initial_ms = 5
//! max_ms = 200
//! ```

pub mod loader;
pub mod validate;

use serde::Deserialize;

use crate::logging::LogLevel;

pub use loader::{default_config_path, load_and_validate, load_from_path};

/// Idle-worker backoff, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 5,
            max_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of workers in the pool.
    pub workers: usize,
    pub backoff: BackoffConfig,
    /// Log level used by [`crate::logging::init_logging`] when no explicit
    /// level is given.
    pub log_level: Option<LogLevel>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers,
            backoff: BackoffConfig::default(),
            log_level: None,
        }
    }
}
