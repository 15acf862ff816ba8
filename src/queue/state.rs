// src/queue/state.rs

//! Scheduling state shared by a queue and its workers.
//!
//! This is plain synchronous data with no locking of its own; the queue wraps
//! it in an `RwLock` and every method here runs under that lock.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::dependency::{DependencyState, EdgeResolver};
use crate::errors::{EngineError, Result};
use crate::job::JobHandle;
use crate::pool::worker::panic_message;
use crate::queue::QueueStats;

/// Which partition a job is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Submitted, not yet handed to a worker.
    Pending,
    /// Handed to a worker, not yet completed.
    Running,
    Completed,
}

#[derive(Debug)]
struct Entry {
    job: JobHandle,
    slot: Slot,
}

/// Outcome of one dispatch scan.
#[derive(Debug, Default)]
pub(crate) struct Dispatch {
    /// The job handed to the caller, now counted as running.
    pub job: Option<JobHandle>,
    /// Jobs whose dependency reported `Passed` and were completed without
    /// running.
    pub skipped: Vec<JobHandle>,
}

#[derive(Debug, Default)]
pub(crate) struct QueueState {
    jobs: HashMap<String, Entry>,
    /// Completed jobs in completion order. Append-only.
    log: Vec<JobHandle>,
    stats: QueueStats,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub fn is_idle(&self) -> bool {
        self.stats.is_idle()
    }

    pub fn get(&self, id: &str) -> Option<JobHandle> {
        self.jobs.get(id).map(|e| e.job.clone())
    }

    pub fn completed_at(&self, index: usize) -> Option<JobHandle> {
        self.log.get(index).cloned()
    }

    /// Insert a new job into the pending partition.
    pub fn insert(&mut self, job: JobHandle) -> Result<()> {
        if self.jobs.contains_key(job.id()) {
            return Err(EngineError::DuplicateJob(job.id().to_string()));
        }

        self.jobs.insert(
            job.id().to_string(),
            Entry {
                job,
                slot: Slot::Pending,
            },
        );
        self.stats.total += 1;
        self.stats.pending += 1;
        Ok(())
    }

    /// Find a dispatchable job and mark it running.
    ///
    /// Jobs reporting `Passed` are completed on the way. Completing them can
    /// unblock others, so the scan repeats until it either finds a ready job
    /// or makes no progress.
    pub fn dispatch(&mut self) -> Dispatch {
        let mut out = Dispatch::default();

        loop {
            // Decide first, then mutate.
            let mut ready: Option<String> = None;
            let mut passed: Vec<String> = Vec::new();

            for (id, entry) in &self.jobs {
                if entry.slot != Slot::Pending {
                    continue;
                }

                let state = evaluate(&entry.job, &*self);
                match state {
                    DependencyState::Ready => {
                        ready = Some(id.clone());
                        break;
                    }
                    DependencyState::Passed => passed.push(id.clone()),
                    DependencyState::Blocked | DependencyState::Unresolved => {}
                }
            }

            let made_progress = !passed.is_empty();

            for id in passed {
                if let Some(job) = self.transition_to_completed(&id, true) {
                    debug!(job = %id, "dependency passed; completing without running");
                    out.skipped.push(job);
                }
            }

            if let Some(id) = ready {
                if let Some(entry) = self.jobs.get_mut(&id) {
                    entry.slot = Slot::Running;
                    self.stats.pending -= 1;
                    self.stats.running += 1;
                    out.job = Some(entry.job.clone());
                }
                return out;
            }

            if !made_progress {
                return out;
            }
        }
    }

    /// Move a job to the completed partition.
    ///
    /// Returns `Ok(Some(job))` when this call performed the transition and
    /// `Ok(None)` when the job was already completed.
    pub fn complete(&mut self, id: &str) -> Result<Option<JobHandle>> {
        let slot = match self.jobs.get(id) {
            Some(entry) => entry.slot,
            None => return Err(EngineError::JobNotFound(id.to_string())),
        };

        if slot == Slot::Completed {
            warn!(job = %id, "completion for already completed job; ignoring");
            return Ok(None);
        }

        Ok(self.transition_to_completed(id, slot == Slot::Pending))
    }

    /// Administrative completion that ignores the dependency state.
    pub fn force_complete(&mut self, id: &str) -> Result<JobHandle> {
        let slot = match self.jobs.get(id) {
            Some(entry) => entry.slot,
            None => return Err(EngineError::JobNotFound(id.to_string())),
        };

        match slot {
            Slot::Pending => self
                .transition_to_completed(id, true)
                .ok_or_else(|| EngineError::JobNotFound(id.to_string())),
            Slot::Running => Err(EngineError::Lifecycle(format!(
                "cannot force completion of running job '{id}'"
            ))),
            Slot::Completed => Err(EngineError::Lifecycle(format!(
                "job '{id}' is already completed"
            ))),
        }
    }

    /// Shared transition used by normal, skipped and forced completion.
    ///
    /// `mark` sets the job's own completion flag; workers already did that
    /// for jobs they ran.
    fn transition_to_completed(&mut self, id: &str, mark: bool) -> Option<JobHandle> {
        let entry = self.jobs.get_mut(id)?;

        match entry.slot {
            Slot::Pending => self.stats.pending -= 1,
            Slot::Running => self.stats.running -= 1,
            Slot::Completed => return None,
        }

        if mark {
            let mut job = entry.job.write();
            job.mark_complete();
            entry.job.publish(&**job);
        } else {
            // Workers publish after `run`; this covers callers that drive a
            // job themselves before reporting it complete.
            let job = entry.job.read();
            entry.job.publish(&**job);
        }

        entry.slot = Slot::Completed;
        self.stats.completed += 1;
        self.log.push(entry.job.clone());
        Some(entry.job.clone())
    }
}

/// Dependency state of a pending job.
///
/// A panicking manager must not take the dispatching worker down with it;
/// the job is treated as `Unresolved` and stays pending.
fn evaluate(job: &JobHandle, resolver: &QueueState) -> DependencyState {
    let guard = job.read();
    match panic::catch_unwind(AssertUnwindSafe(|| guard.dependency().state(resolver))) {
        Ok(state) => state,
        Err(payload) => {
            warn!(
                job = %job.id(),
                panic = %panic_message(payload.as_ref()),
                "dependency manager panicked; treating job as unresolved"
            );
            DependencyState::Unresolved
        }
    }
}

impl EdgeResolver for QueueState {
    fn is_complete(&self, id: &str) -> Option<bool> {
        self.jobs.get(id).map(|e| e.slot == Slot::Completed)
    }
}

pub(crate) fn read_state(lock: &RwLock<QueueState>) -> RwLockReadGuard<'_, QueueState> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_state(lock: &RwLock<QueueState>) -> RwLockWriteGuard<'_, QueueState> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
