use jobengine::check::{Check, CheckBase, CheckOutput};
use jobengine::job::{Job, JobBase};
use jobengine::types::JobType;

/// Check that passes or fails as told, with an optional message.
#[derive(Debug)]
pub struct MockCheck {
    base: CheckBase,
    should_pass: bool,
}

impl MockCheck {
    pub fn new(id: &str, should_pass: bool) -> Self {
        Self {
            base: CheckBase::new(id, JobType::new("mock-check", 0)),
            should_pass,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.base.message = message.to_string();
        self
    }

    pub fn in_suites(mut self, suites: &[&str]) -> Self {
        self.base.set_suites(suites.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl Job for MockCheck {
    fn base(&self) -> &JobBase {
        &self.base.job
    }

    fn base_mut(&mut self) -> &mut JobBase {
        &mut self.base.job
    }

    fn run(&mut self) {
        self.base.start_timer();
        self.base.finish(self.should_pass);
    }

    fn as_check(&self) -> Option<&dyn Check> {
        Some(self)
    }
}

impl Check for MockCheck {
    fn name(&self) -> &str {
        &self.base.job.job_type().name
    }

    fn set_id(&mut self, id: &str) {
        self.base.set_id(id);
    }

    fn suites(&self) -> &[String] {
        self.base.suites()
    }

    fn set_suites(&mut self, suites: Vec<String>) {
        self.base.set_suites(suites);
    }

    fn output(&self) -> CheckOutput {
        self.base.output(self.name())
    }
}
