// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! [`EngineError`] covers engine-level calls (submit, start, bind, config).
//! Failures *inside* a job never surface here; they are recorded on the job
//! as a [`JobError`] and only aggregated afterwards by the reporting layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Duplicate job id: {0}")]
    DuplicateJob(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Results producer already registered: {0}")]
    DuplicateProducer(String),

    #[error("Unknown results producer: {0}")]
    UnknownProducer(String),

    #[error("{} job(s) did not succeed: {}", .0.len(), .0.join("; "))]
    JobsFailed(Vec<String>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Terminal error of a single job.
///
/// Cloneable so that reports can copy it out of the job lock.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("{0}")]
    Failed(String),

    #[error("job panicked: {0}")]
    Panicked(String),

    #[error("{}", join_errors(.0))]
    Multiple(Vec<JobError>),
}

impl From<anyhow::Error> for JobError {
    fn from(err: anyhow::Error) -> Self {
        JobError::Failed(format!("{err:#}"))
    }
}

fn join_errors(errors: &[JobError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EngineError>;
