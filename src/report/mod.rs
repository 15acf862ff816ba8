// src/report/mod.rs

//! Read-only reporting over completed jobs.
//!
//! - [`JobReport`] is a serialisable snapshot of one job's outcome.
//! - [`check_results`] aggregates every failure into one error without
//!   stopping at the first.
//! - [`ResultsProducer`] is the seam for output formats; [`registry`] maps
//!   tags to producer constructors and [`producers`] holds the built-ins.

pub mod producers;
pub mod registry;

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::check::CheckOutput;
use crate::errors::{EngineError, Result};
use crate::job::JobHandle;
use crate::queue::Queue;
use crate::types::JobType;

pub use producers::{LogProducer, SummaryProducer};
pub use registry::{global_producers, init_producers, ProducerFactory, ProducerRegistry};

/// Outcome of one job, copied out of the job lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub id: String,
    pub job_type: JobType,
    pub completed: bool,
    pub passed: bool,
    pub error: Option<String>,
    pub check: Option<CheckOutput>,
}

impl JobReport {
    /// Snapshot from the handle's published outcome.
    ///
    /// Unfinished jobs are reported without touching the job lock; the check
    /// output is only read once the job has completed.
    pub fn from_handle(handle: &JobHandle) -> Self {
        let completed = handle.completed();
        let error = handle.error().map(|e| e.to_string());
        let check = if completed {
            handle.read().as_check().map(|c| c.output())
        } else {
            None
        };
        let passed = completed && error.is_none() && check.as_ref().is_none_or(|c| c.passed);

        Self {
            id: handle.id().to_string(),
            job_type: handle.job_type().clone(),
            completed,
            passed,
            error,
            check,
        }
    }

    /// One-line reason for a non-passing job.
    pub fn failure_reason(&self) -> Option<String> {
        if self.passed {
            return None;
        }
        let reason = match (&self.error, self.completed) {
            (Some(err), _) => err.clone(),
            (None, false) => "did not complete".to_string(),
            (None, true) => "check did not pass".to_string(),
        };
        Some(format!("{}: {}", self.id, reason))
    }
}

/// Aggregate the outcome of `jobs`.
///
/// Every job is inspected; the error lists each one that failed or did not
/// complete.
pub fn check_results(jobs: &[JobHandle]) -> Result<()> {
    let failures: Vec<String> = jobs
        .iter()
        .map(JobReport::from_handle)
        .filter_map(|r| r.failure_reason())
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(EngineError::JobsFailed(failures))
    }
}

/// Output format for completed jobs.
pub trait ResultsProducer: Send {
    /// Collect outcomes. May be called once per report.
    fn populate(&mut self, jobs: &[JobHandle]) -> Result<()>;

    /// Write the report.
    fn output(&self, out: &mut dyn Write) -> Result<()>;
}

/// Drain the queue's results through `producer`, write the report, then
/// return the aggregated verdict.
///
/// Intended to be called after [`Queue::wait`].
pub async fn produce_results(
    queue: &dyn Queue,
    producer: &mut dyn ResultsProducer,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let jobs = queue.results().collect().await;
    debug!(jobs = jobs.len(), "producing results");

    producer.populate(&jobs)?;
    producer.output(out)?;
    check_results(&jobs)
}
