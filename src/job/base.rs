// src/job/base.rs

use crate::dependency::{Always, DependencyManager};
use crate::errors::JobError;
use crate::types::JobType;

/// Shared bookkeeping for job implementations.
#[derive(Debug)]
pub struct JobBase {
    id: String,
    job_type: JobType,
    priority: i32,
    completed: bool,
    errors: Vec<JobError>,
    dependency: Box<dyn DependencyManager>,
}

impl JobBase {
    pub fn new(id: impl Into<String>, job_type: JobType) -> Self {
        Self {
            id: id.into(),
            job_type,
            priority: 0,
            completed: false,
            errors: Vec::new(),
            dependency: Box::new(Always::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn job_type(&self) -> &JobType {
        &self.job_type
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn mark_complete(&mut self) {
        self.completed = true;
    }

    pub fn dependency(&self) -> &dyn DependencyManager {
        self.dependency.as_ref()
    }

    pub fn set_dependency(&mut self, dep: Box<dyn DependencyManager>) {
        self.dependency = dep;
    }

    pub fn add_error(&mut self, err: JobError) {
        self.errors.push(err);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The terminal error: `None` on success, the single error if there is
    /// one, otherwise all of them.
    pub fn error(&self) -> Option<JobError> {
        match self.errors.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            many => Some(JobError::Multiple(many.to_vec())),
        }
    }
}
