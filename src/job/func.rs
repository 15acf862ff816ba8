// src/job/func.rs

use std::fmt;

use tracing::debug;

use crate::dependency::DependencyManager;
use crate::job::{Job, JobBase};
use crate::types::JobType;

type Work = Box<dyn FnMut() -> anyhow::Result<()> + Send + Sync>;

/// Job whose work is a closure.
///
/// An `Err` from the closure becomes the job's terminal error.
pub struct FnJob {
    base: JobBase,
    work: Work,
}

impl FnJob {
    pub fn new<F>(id: impl Into<String>, work: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            base: JobBase::new(id, JobType::new("fn", 0)),
            work: Box::new(work),
        }
    }

    pub fn with_dependency(mut self, dep: impl DependencyManager + 'static) -> Self {
        self.base.set_dependency(Box::new(dep));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.base.set_priority(priority);
        self
    }
}

impl fmt::Debug for FnJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnJob")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl Job for FnJob {
    fn base(&self) -> &JobBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut JobBase {
        &mut self.base
    }

    fn run(&mut self) {
        if self.base.completed() {
            debug!(job = %self.base.id(), "job already completed; not running again");
            return;
        }

        if let Err(err) = (self.work)() {
            self.base.add_error(err.into());
        }
        self.base.mark_complete();
    }
}
