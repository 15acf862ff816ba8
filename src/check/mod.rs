// src/check/mod.rs

//! Check capability: a richer job contract for validation-style work.
//!
//! A check is a [`Job`] that also belongs to named suites and reports a
//! structured [`CheckOutput`]. Implementors embed a [`CheckBase`] (which
//! itself embeds a [`JobBase`]) and override [`Job::as_check`] to return
//! `Some(self)` so reporting code can reach the capability through a plain
//! job handle.

use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::job::{Job, JobBase};
use crate::types::JobType;

pub trait Check: Job {
    /// Name of the check implementation, usually the job type name.
    fn name(&self) -> &str;

    /// Rename the check. Only meaningful before submission; queues index by
    /// the ID seen at `put`.
    fn set_id(&mut self, id: &str);

    fn suites(&self) -> &[String];

    fn set_suites(&mut self, suites: Vec<String>);

    fn output(&self) -> CheckOutput;
}

/// Start and end of a check's execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimingInfo {
    pub start: Option<SystemTime>,
    pub end: Option<SystemTime>,
}

impl TimingInfo {
    /// Elapsed time, or zero if the check has not both started and ended.
    pub fn duration(&self) -> Duration {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.duration_since(start).unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }
}

/// Common report format for all checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutput {
    pub completed: bool,
    pub passed: bool,
    pub check: String,
    pub name: String,
    pub message: String,
    pub error: Option<String>,
    pub suites: Vec<String>,
    pub timing: TimingInfo,
}

/// Bookkeeping shared by check implementations.
#[derive(Debug)]
pub struct CheckBase {
    pub job: JobBase,
    pub message: String,
    passed: bool,
    suites: Vec<String>,
    timing: TimingInfo,
}

impl CheckBase {
    pub fn new(id: impl Into<String>, job_type: JobType) -> Self {
        Self {
            job: JobBase::new(id, job_type),
            message: String::new(),
            passed: false,
            suites: Vec::new(),
            timing: TimingInfo::default(),
        }
    }

    pub fn set_id(&mut self, id: &str) {
        self.job.set_id(id);
    }

    pub fn start_timer(&mut self) {
        self.timing.start = Some(SystemTime::now());
    }

    /// Record the verdict, stop the timer and mark the job complete.
    pub fn finish(&mut self, passed: bool) {
        self.timing.end = Some(SystemTime::now());
        self.passed = passed && !self.job.has_errors();
        self.job.mark_complete();
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn suites(&self) -> &[String] {
        &self.suites
    }

    pub fn set_suites(&mut self, suites: Vec<String>) {
        self.suites = suites;
    }

    pub fn timing(&self) -> TimingInfo {
        self.timing
    }

    /// Build the standard output; `check` is the implementation name.
    pub fn output(&self, check: &str) -> CheckOutput {
        let error = self.job.error().map(|e| e.to_string());
        CheckOutput {
            completed: self.job.completed(),
            passed: self.passed && error.is_none(),
            check: check.to_string(),
            name: self.job.id().to_string(),
            message: self.message.clone(),
            error,
            suites: self.suites.clone(),
            timing: self.timing,
        }
    }
}
