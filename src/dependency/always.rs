// src/dependency/always.rs

use crate::dependency::{DependencyManager, DependencyState, EdgeResolver, EdgeSet};
use crate::errors::Result;

/// Runs whenever its edges are complete. Default manager for new jobs.
#[derive(Debug, Clone, Default)]
pub struct Always {
    edges: EdgeSet,
}

impl Always {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a job that runs after `ids`.
    pub fn after<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dep = Self::new();
        for id in ids {
            dep.add_edge(id.as_ref())?;
        }
        Ok(dep)
    }
}

impl DependencyManager for Always {
    fn kind(&self) -> &'static str {
        "always"
    }

    fn state(&self, resolver: &dyn EdgeResolver) -> DependencyState {
        self.edges.gate(resolver).unwrap_or(DependencyState::Ready)
    }

    fn edges(&self) -> &[String] {
        self.edges.as_slice()
    }

    fn add_edge(&mut self, id: &str) -> Result<()> {
        self.edges.add(id)
    }
}
