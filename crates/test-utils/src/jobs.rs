use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use jobengine::errors::JobError;
use jobengine::job::{Job, JobBase};
use jobengine::types::JobType;

/// Shared, ordered log of job events ("start:<id>", "run:<id>").
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// IDs of jobs whose work ran to the end, in order.
    pub fn finished(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("run:").map(str::to_string))
            .collect()
    }

    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    pub fn has_started(&self, id: &str) -> bool {
        self.started().iter().any(|s| s == id)
    }

    pub fn has_run(&self, id: &str) -> bool {
        self.finished().iter().any(|s| s == id)
    }
}

/// A latch that blocks job bodies until a test opens it.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// What a [`TestJob`] does when run.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Succeed,
    Fail(String),
    Panic(String),
    Sleep(Duration),
    WaitFor(Gate),
}

/// Scripted job for engine tests.
///
/// Records `start:<id>` when its body begins and `run:<id>` when it
/// finishes without panicking.
#[derive(Debug)]
pub struct TestJob {
    base: JobBase,
    behaviour: Behaviour,
    recorder: Recorder,
}

impl TestJob {
    pub fn new(id: &str, behaviour: Behaviour, recorder: Recorder) -> Self {
        Self {
            base: JobBase::new(id, JobType::new("test", 1)),
            behaviour,
            recorder,
        }
    }
}

impl Job for TestJob {
    fn base(&self) -> &JobBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut JobBase {
        &mut self.base
    }

    fn run(&mut self) {
        let id = self.base.id().to_string();
        self.recorder.record(format!("start:{id}"));

        match &self.behaviour {
            Behaviour::Succeed => {}
            Behaviour::Fail(msg) => self.base.add_error(JobError::Failed(msg.clone())),
            Behaviour::Panic(msg) => panic!("{}", msg),
            Behaviour::Sleep(d) => std::thread::sleep(*d),
            Behaviour::WaitFor(gate) => gate.wait(),
        }

        self.base.mark_complete();
        self.recorder.record(format!("run:{id}"));
    }
}
