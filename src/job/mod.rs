// src/job/mod.rs

//! Units of work.
//!
//! - [`Job`] is the contract every unit of work satisfies.
//! - [`JobBase`] implements the bookkeeping (identity, type, priority,
//!   completion, errors, dependency). Concrete jobs embed one and only
//!   supply [`Job::run`].
//! - [`JobHandle`] is the shared, lockable form a job takes once a queue owns
//!   it.
//! - [`FnJob`] and [`ShellJob`] are general purpose variants.

pub mod base;
pub mod func;
pub mod handle;
pub mod shell;

use std::fmt;

use crate::check::Check;
use crate::dependency::DependencyManager;
use crate::errors::JobError;
use crate::types::JobType;

pub use base::JobBase;
pub use func::FnJob;
pub use handle::JobHandle;
pub use shell::ShellJob;

/// A unit of work.
///
/// `run` is called at most once by a worker. Implementations record failures
/// with [`Job::add_error`] instead of returning them, and mark themselves
/// complete when done. Workers also mark the job complete after `run`
/// returns, so forgetting to do so does not wedge the queue.
pub trait Job: Send + Sync + fmt::Debug {
    fn base(&self) -> &JobBase;

    fn base_mut(&mut self) -> &mut JobBase;

    fn run(&mut self);

    fn id(&self) -> &str {
        self.base().id()
    }

    fn completed(&self) -> bool {
        self.base().completed()
    }

    fn mark_complete(&mut self) {
        self.base_mut().mark_complete();
    }

    fn job_type(&self) -> &JobType {
        self.base().job_type()
    }

    fn dependency(&self) -> &dyn DependencyManager {
        self.base().dependency()
    }

    fn set_dependency(&mut self, dep: Box<dyn DependencyManager>) {
        self.base_mut().set_dependency(dep);
    }

    fn priority(&self) -> i32 {
        self.base().priority()
    }

    fn set_priority(&mut self, priority: i32) {
        self.base_mut().set_priority(priority);
    }

    fn error(&self) -> Option<JobError> {
        self.base().error()
    }

    fn add_error(&mut self, err: JobError) {
        self.base_mut().add_error(err);
    }

    /// Capability query for the check layer.
    fn as_check(&self) -> Option<&dyn Check> {
        None
    }
}
