// src/queue/results.rs

use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::job::JobHandle;
use crate::queue::state::{read_state, QueueState};
use crate::queue::QueueStats;

/// Cursor over a queue's completed jobs.
///
/// Each stream yields every completed job exactly once, in completion order.
/// Streams are independent: creating a second one does not steal entries
/// from the first.
pub struct ResultsStream {
    state: Arc<RwLock<QueueState>>,
    stats_rx: watch::Receiver<QueueStats>,
    cursor: usize,
}

impl ResultsStream {
    pub(crate) fn new(state: Arc<RwLock<QueueState>>, stats_rx: watch::Receiver<QueueStats>) -> Self {
        Self {
            state,
            stats_rx,
            cursor: 0,
        }
    }

    /// Number of jobs this stream has yielded so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Next already-completed job, without waiting.
    pub fn try_next(&mut self) -> Option<JobHandle> {
        let job = read_state(&self.state).completed_at(self.cursor)?;
        self.cursor += 1;
        Some(job)
    }

    /// Every job completed so far that this stream has not yielded yet.
    pub fn drain_ready(&mut self) -> Vec<JobHandle> {
        let mut jobs = Vec::new();
        while let Some(job) = self.try_next() {
            jobs.push(job);
        }
        jobs
    }

    /// Next completed job.
    ///
    /// Waits for a new completion while the queue still has pending or
    /// running work. Returns `None` once the queue is idle and every
    /// completion has been yielded.
    pub async fn next(&mut self) -> Option<JobHandle> {
        loop {
            // Mark the current value seen before inspecting state, so a
            // completion that lands after the check still wakes `changed`.
            self.stats_rx.borrow_and_update();

            {
                let state = read_state(&self.state);
                if let Some(job) = state.completed_at(self.cursor) {
                    self.cursor += 1;
                    return Some(job);
                }
                if state.is_idle() {
                    return None;
                }
            }

            if self.stats_rx.changed().await.is_err() {
                return self.try_next();
            }
        }
    }

    /// Drain the stream until the queue is idle.
    pub async fn collect(mut self) -> Vec<JobHandle> {
        let mut jobs = Vec::new();
        while let Some(job) = self.next().await {
            jobs.push(job);
        }
        jobs
    }
}

impl fmt::Debug for ResultsStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsStream")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
