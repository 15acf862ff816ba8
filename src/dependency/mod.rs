// src/dependency/mod.rs

//! Dependency managers: the per-job policy deciding dispatch eligibility.
//!
//! - [`DependencyState`] is the discrete answer a manager gives.
//! - [`EdgeResolver`] is the read-only view of the queue a manager consults
//!   for its prerequisite job IDs ("edges").
//! - [`EdgeSet`] holds the edges and implements the gating every manager
//!   applies before its own condition.
//! - [`always`] and [`file`] contain the provided managers.

pub mod always;
pub mod file;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

pub use always::Always;
pub use file::{CreatesFile, LocalFile};

/// Dispatch eligibility of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyState {
    /// Eligible for dispatch now.
    Ready,
    /// Waiting on prerequisite jobs.
    Blocked,
    /// Already satisfied; complete the job without running it.
    Passed,
    /// Cannot currently be determined. Treated like `Blocked`.
    Unresolved,
}

impl DependencyState {
    /// Whether a worker may receive the job.
    pub fn is_dispatchable(self) -> bool {
        matches!(self, DependencyState::Ready)
    }
}

/// Read-only lookup of prerequisite completion.
pub trait EdgeResolver {
    /// `Some(completed)` for a known job ID, `None` when the ID is unknown.
    fn is_complete(&self, id: &str) -> Option<bool>;
}

/// Policy object bound to a job.
///
/// `state` must be free of side effects: the queue may evaluate it many times
/// while scanning for work, always under its own lock.
pub trait DependencyManager: Send + Sync + fmt::Debug {
    /// Type tag used by external serialisation layers.
    fn kind(&self) -> &'static str;

    fn state(&self, resolver: &dyn EdgeResolver) -> DependencyState;

    fn edges(&self) -> &[String];

    fn add_edge(&mut self, id: &str) -> Result<()>;
}

/// Prerequisite job IDs shared by every provided manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: Vec<String>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.edges
    }

    pub fn add(&mut self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(EngineError::ConfigError(
                "dependency edge must name a job id".to_string(),
            ));
        }
        if self.edges.iter().any(|e| e == id) {
            return Err(EngineError::ConfigError(format!(
                "dependency edge '{id}' already exists"
            )));
        }
        self.edges.push(id.to_string());
        Ok(())
    }

    /// Gate on the edges.
    ///
    /// Returns `Some(state)` when the edges alone decide the outcome
    /// (`Unresolved` for unknown prerequisites, `Blocked` for unfinished
    /// ones) and `None` when every edge is complete.
    pub fn gate(&self, resolver: &dyn EdgeResolver) -> Option<DependencyState> {
        let mut blocked = false;

        for edge in &self.edges {
            match resolver.is_complete(edge) {
                Some(true) => {}
                Some(false) => blocked = true,
                None => return Some(DependencyState::Unresolved),
            }
        }

        if blocked {
            Some(DependencyState::Blocked)
        } else {
            None
        }
    }
}
