use std::sync::{Arc, Mutex};

use jobengine::dependency::{DependencyManager, DependencyState, EdgeResolver, EdgeSet};
use jobengine::errors::Result;

/// Dependency whose state is set directly by the test, through any clone.
///
/// Edges still gate first, like the provided managers.
#[derive(Debug, Clone)]
pub struct ScriptedDependency {
    state: Arc<Mutex<DependencyState>>,
    edges: EdgeSet,
}

impl ScriptedDependency {
    pub fn new(state: DependencyState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            edges: EdgeSet::new(),
        }
    }

    pub fn set(&self, state: DependencyState) {
        *self.state.lock().unwrap() = state;
    }
}

impl DependencyManager for ScriptedDependency {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    fn state(&self, resolver: &dyn EdgeResolver) -> DependencyState {
        if let Some(state) = self.edges.gate(resolver) {
            return state;
        }
        *self.state.lock().unwrap()
    }

    fn edges(&self) -> &[String] {
        self.edges.as_slice()
    }

    fn add_edge(&mut self, id: &str) -> Result<()> {
        self.edges.add(id)
    }
}
