// src/lib.rs

//! Concurrent, dependency-aware job execution engine.
//!
//! Producers submit [`job::Job`]s to a [`queue::Queue`]; starting the queue
//! starts its [`pool::Runner`], whose workers repeatedly take a job whose
//! [`dependency::DependencyManager`] reports `Ready`, run it, and hand it
//! back. [`queue::Queue::wait`] blocks until nothing is pending or running,
//! after which results can be streamed and aggregated with [`report`].

pub mod check;
pub mod config;
pub mod dependency;
pub mod errors;
pub mod fs;
pub mod job;
pub mod logging;
pub mod pool;
pub mod queue;
pub mod report;
pub mod types;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::job::{Job, JobHandle};
use crate::queue::{LocalUnordered, Queue};

/// High-level entry point: run a batch of jobs to completion.
///
/// This wires together:
/// - a [`LocalUnordered`] queue sized from `cfg`
/// - submission of every job (all submission errors are collected, not just
///   the first)
/// - waiting for the batch and shutting the workers down
///
/// Cancelling `cancel` stops dispatch; jobs already running finish and jobs
/// never dispatched are left out of the result.
///
/// Returns the completed jobs in completion order. Per-job failures are not
/// errors here; pass the result to [`report::check_results`] for a verdict.
pub async fn run_jobs(
    cfg: &EngineConfig,
    jobs: Vec<Box<dyn Job>>,
    cancel: CancellationToken,
) -> Result<Vec<JobHandle>> {
    cfg.validate()?;

    let queue = LocalUnordered::from_config(cfg);
    queue.start(cancel.clone())?;

    let mut rejected = Vec::new();
    for job in jobs {
        if let Err(err) = queue.put(job) {
            warn!(error = %err, "job rejected");
            rejected.push(err.to_string());
        }
    }

    let stats = queue.stats();
    info!(total = stats.total, "registered jobs; waiting for completion");

    tokio::select! {
        res = queue.wait() => res?,
        _ = cancel.cancelled() => {
            warn!("cancelled; letting in-flight jobs drain");
        }
    }
    queue.runner().close().await;

    let stats = queue.stats();
    info!(
        completed = stats.completed,
        pending = stats.pending,
        "job batch finished"
    );

    if !rejected.is_empty() {
        return Err(EngineError::JobsFailed(rejected));
    }

    Ok(queue.results().drain_ready())
}
