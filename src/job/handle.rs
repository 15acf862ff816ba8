// src/job/handle.rs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::JobError;
use crate::job::Job;
use crate::types::JobType;

/// Completion state published once a job has finished.
///
/// Lives outside the job lock so status reads never wait on a running job.
#[derive(Debug, Default)]
struct Outcome {
    completed: AtomicBool,
    error: Mutex<Option<JobError>>,
}

/// Shared handle to a job owned by a queue.
///
/// The ID and type are captured at submission so the queue can index and
/// log without taking the job lock. Workers hold the write lock for the
/// duration of `run`; `completed` and `error` read the published outcome
/// instead.
#[derive(Clone)]
pub struct JobHandle {
    id: Arc<str>,
    job_type: Arc<JobType>,
    outcome: Arc<Outcome>,
    inner: Arc<RwLock<Box<dyn Job>>>,
}

impl JobHandle {
    pub fn new(job: Box<dyn Job>) -> Self {
        // Jobs may be submitted already completed.
        let outcome = if job.completed() {
            Outcome {
                completed: AtomicBool::new(true),
                error: Mutex::new(job.error()),
            }
        } else {
            Outcome::default()
        };

        Self {
            id: Arc::from(job.id()),
            job_type: Arc::new(job.job_type().clone()),
            outcome: Arc::new(outcome),
            inner: Arc::new(RwLock::new(job)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn job_type(&self) -> &JobType {
        &self.job_type
    }

    /// Lock for reading.
    ///
    /// Blocks while the job is running. Job panics are caught inside the
    /// lock, so poisoning only happens if the panic machinery itself fails;
    /// the data is still consistent then.
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Job>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Job>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the job's outcome has been published. Never blocks on the job.
    pub fn completed(&self) -> bool {
        self.outcome.completed.load(Ordering::Acquire)
    }

    /// Terminal error from the published outcome. `None` while running.
    pub fn error(&self) -> Option<JobError> {
        self.outcome
            .error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy the job's completion and error onto the handle.
    ///
    /// Called with the job lock held, after `run` or a direct completion.
    pub(crate) fn publish(&self, job: &dyn Job) {
        *self.outcome.error.lock().unwrap_or_else(PoisonError::into_inner) = job.error();
        self.outcome.completed.store(job.completed(), Ordering::Release);
    }

    pub fn ptr_eq(&self, other: &JobHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("completed", &self.completed())
            .finish_non_exhaustive()
    }
}
