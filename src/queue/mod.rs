// src/queue/mod.rs

//! Job queues.
//!
//! A queue is the single source of truth for scheduling state: which jobs
//! exist, which are waiting, running or completed, and in what order they
//! completed. Workers (see [`crate::pool`]) pull from it and report back.
//!
//! - [`state`] holds the lock-free scheduling data and transitions.
//! - [`results`] provides [`ResultsStream`], the read-only completion feed.
//! - [`local`] provides [`LocalUnordered`], the in-process queue with no
//!   dispatch ordering beyond dependency gating.

pub mod local;
pub mod results;
pub(crate) mod state;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::job::{Job, JobHandle};
use crate::pool::Runner;

pub use local::LocalUnordered;
pub use results::ResultsStream;

/// Point-in-time counters.
///
/// `total == pending + running + completed` for every snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
}

impl QueueStats {
    /// No job is waiting or running.
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.running == 0
    }
}

/// Queue contract shared by runners and producers.
pub trait Queue: Send + Sync {
    /// Submit a job. Fails without side effects if the ID is taken.
    fn put(&self, job: Box<dyn Job>) -> Result<()>;

    /// Look a job up by ID in any partition.
    fn get(&self, id: &str) -> Option<JobHandle>;

    /// Hand out a dispatchable job, or `None` if nothing is ready or
    /// `cancel` has fired. Non-blocking.
    fn next(&self, cancel: &CancellationToken) -> Option<JobHandle>;

    /// Record that a job finished. Publishing never blocks.
    fn complete(&self, job: &JobHandle);

    /// Complete a pending job without running it, regardless of its
    /// dependency state.
    fn force_complete(&self, id: &str) -> Result<()>;

    fn started(&self) -> bool;

    /// Start the bound runner. Idempotent.
    fn start(&self, cancel: CancellationToken) -> Result<()>;

    fn results(&self) -> ResultsStream;

    fn stats(&self) -> QueueStats;

    fn runner(&self) -> Arc<dyn Runner>;

    /// Replace the runner. Only allowed before the queue starts.
    fn set_runner(&self, runner: Arc<dyn Runner>) -> Result<()>;

    /// Resolves when new work may have become dispatchable. Spurious wakeups
    /// are allowed; callers re-check with [`Queue::next`].
    fn work_available(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Wait until no job is pending or running.
    fn wait(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
