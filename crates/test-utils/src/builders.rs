use std::time::Duration;

use jobengine::dependency::{Always, DependencyManager};
use jobengine::job::Job;

use crate::jobs::{Behaviour, Gate, Recorder, TestJob};

/// Builder for [`TestJob`] to simplify test setup.
pub struct TestJobBuilder {
    id: String,
    behaviour: Behaviour,
    recorder: Recorder,
    after: Vec<String>,
    dependency: Option<Box<dyn DependencyManager>>,
    priority: i32,
}

impl TestJobBuilder {
    pub fn new(id: &str, recorder: &Recorder) -> Self {
        Self {
            id: id.to_string(),
            behaviour: Behaviour::Succeed,
            recorder: recorder.clone(),
            after: Vec::new(),
            dependency: None,
            priority: 0,
        }
    }

    /// Run only after `dep` has completed.
    pub fn after(mut self, dep: &str) -> Self {
        self.after.push(dep.to_string());
        self
    }

    pub fn failing(mut self, msg: &str) -> Self {
        self.behaviour = Behaviour::Fail(msg.to_string());
        self
    }

    pub fn panicking(mut self, msg: &str) -> Self {
        self.behaviour = Behaviour::Panic(msg.to_string());
        self
    }

    pub fn sleeping(mut self, d: Duration) -> Self {
        self.behaviour = Behaviour::Sleep(d);
        self
    }

    pub fn gated(mut self, gate: &Gate) -> Self {
        self.behaviour = Behaviour::WaitFor(gate.clone());
        self
    }

    /// Use a custom dependency manager; `after` edges are added to it.
    pub fn dependency(mut self, dep: impl DependencyManager + 'static) -> Self {
        self.dependency = Some(Box::new(dep));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> Box<dyn Job> {
        let mut dep: Box<dyn DependencyManager> =
            self.dependency.unwrap_or_else(|| Box::new(Always::new()));
        for edge in &self.after {
            dep.add_edge(edge).expect("valid dependency edge");
        }

        let mut job = TestJob::new(&self.id, self.behaviour, self.recorder);
        job.set_dependency(dep);
        job.set_priority(self.priority);
        Box::new(job)
    }
}
