mod common;
use crate::common::{init_tracing, started_queue, with_timeout, Recorder, TestJobBuilder};

use std::error::Error;
use std::io::Write;

use jobengine::check::Check;
use jobengine::errors::{EngineError, Result as EngineResult};
use jobengine::job::{Job, JobHandle};
use jobengine::queue::Queue;
use jobengine::report::{
    check_results, init_producers, produce_results, JobReport, ProducerRegistry,
    ResultsProducer, SummaryProducer,
};
use jobengine_test_utils::check::MockCheck;

type TestResult = Result<(), Box<dyn Error>>;

/// Producer that writes a fixed marker, to tell factories apart.
struct Marker(&'static str);

impl ResultsProducer for Marker {
    fn populate(&mut self, _jobs: &[JobHandle]) -> EngineResult<()> {
        Ok(())
    }

    fn output(&self, out: &mut dyn Write) -> EngineResult<()> {
        write!(out, "{}", self.0)?;
        Ok(())
    }
}

fn first_marker() -> Box<dyn ResultsProducer> {
    Box::new(Marker("first"))
}

fn second_marker() -> Box<dyn ResultsProducer> {
    Box::new(Marker("second"))
}

fn render(producer: &dyn ResultsProducer) -> String {
    let mut buf = Vec::new();
    producer.output(&mut buf).expect("output succeeds");
    String::from_utf8(buf).expect("utf-8 output")
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn test_builtin_producers_are_registered() -> TestResult {
    let registry = ProducerRegistry::with_builtins();
    assert_eq!(registry.tags(), vec!["log", "summary"]);
    registry.create("summary")?;
    registry.create("log")?;
    Ok(())
}

#[test]
fn test_duplicate_tag_keeps_first_registration() -> TestResult {
    init_tracing();
    let registry = ProducerRegistry::new();

    registry.register("marker", first_marker)?;
    match registry.register("marker", second_marker) {
        Err(EngineError::DuplicateProducer(tag)) => assert_eq!(tag, "marker"),
        other => panic!("expected DuplicateProducer, got {:?}", other),
    }

    let producer = registry.create("marker")?;
    assert_eq!(render(producer.as_ref()), "first");
    Ok(())
}

#[test]
fn test_unknown_tag_is_an_error() {
    let registry = ProducerRegistry::with_builtins();
    assert!(matches!(
        registry.create("html"),
        Err(EngineError::UnknownProducer(tag)) if tag == "html"
    ));
}

#[test]
fn test_global_registry_initialises_once() -> TestResult {
    let first = init_producers();
    let second = init_producers();
    assert!(std::ptr::eq(first, second));

    first.register("global-marker", first_marker)?;
    assert!(second.tags().contains(&"global-marker".to_string()));
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation and output
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_check_results_lists_every_failure() -> TestResult {
    init_tracing();
    let recorder = Recorder::new();
    let (queue, _cancel) = started_queue(2);

    queue.put(TestJobBuilder::new("good", &recorder).build())?;
    queue.put(TestJobBuilder::new("bad-1", &recorder).failing("first problem").build())?;
    queue.put(TestJobBuilder::new("bad-2", &recorder).panicking("second problem").build())?;
    with_timeout(queue.wait()).await?;

    let jobs = with_timeout(queue.results().collect()).await;

    match check_results(&jobs) {
        Err(EngineError::JobsFailed(mut failures)) => {
            failures.sort();
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0], "bad-1: first problem");
            assert!(failures[1].starts_with("bad-2: job panicked: second problem"));
        }
        other => panic!("expected JobsFailed, got {:?}", other),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_all_passing_jobs_aggregate_to_ok() -> TestResult {
    init_tracing();
    let recorder = Recorder::new();
    let (queue, _cancel) = started_queue(2);

    for id in ["x", "y"] {
        queue.put(TestJobBuilder::new(id, &recorder).build())?;
    }
    with_timeout(queue.wait()).await?;

    let jobs = with_timeout(queue.results().collect()).await;
    check_results(&jobs)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_summary_report() -> TestResult {
    init_tracing();
    let recorder = Recorder::new();
    let (queue, _cancel) = started_queue(2);

    queue.put(TestJobBuilder::new("b-fails", &recorder).failing("broke").build())?;
    queue.put(TestJobBuilder::new("a-passes", &recorder).build())?;
    with_timeout(queue.wait()).await?;

    let mut producer = SummaryProducer::new();
    let mut out = Vec::new();
    let verdict = produce_results(&*queue, &mut producer, &mut out).await;

    assert!(matches!(verdict, Err(EngineError::JobsFailed(ref f)) if f.len() == 1));
    assert_eq!(
        String::from_utf8(out)?,
        "PASS a-passes (test@v1 (json))\n\
         FAIL b-fails: broke\n\
         1 passed, 1 failed, 2 total\n"
    );
    assert_eq!(producer.reports().len(), 2);
    Ok(())
}

#[test]
fn test_report_for_unfinished_job() {
    let recorder = Recorder::new();
    let handle = JobHandle::new(TestJobBuilder::new("idle", &recorder).build());

    let report = JobReport::from_handle(&handle);
    assert!(!report.completed);
    assert!(!report.passed);
    assert_eq!(report.failure_reason().as_deref(), Some("idle: did not complete"));
}

// ---------------------------------------------------------------------------
// Check capability
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_checks_report_structured_output() -> TestResult {
    init_tracing();
    let (queue, _cancel) = started_queue(2);

    queue.put(Box::new(
        MockCheck::new("disk-space", true)
            .with_message("plenty left")
            .in_suites(&["host", "nightly"]),
    ))?;
    queue.put(Box::new(MockCheck::new("kernel-version", false)))?;
    with_timeout(queue.wait()).await?;

    let passing = queue.get("disk-space").expect("registered");
    {
        let job = passing.read();
        let check = job.as_check().expect("check capability");
        let output = check.output();
        assert!(output.completed);
        assert!(output.passed);
        assert_eq!(output.check, "mock-check");
        assert_eq!(output.name, "disk-space");
        assert_eq!(output.message, "plenty left");
        assert_eq!(output.suites, vec!["host", "nightly"]);
        assert!(output.timing.start.is_some() && output.timing.end.is_some());
        assert_eq!(check.suites(), ["host", "nightly"]);
    }

    let jobs = with_timeout(queue.results().collect()).await;
    match check_results(&jobs) {
        Err(EngineError::JobsFailed(failures)) => {
            assert_eq!(failures, vec!["kernel-version: check did not pass"]);
        }
        other => panic!("expected JobsFailed, got {:?}", other),
    }

    let report = JobReport::from_handle(&passing);
    assert!(report.passed);
    assert!(report.check.is_some());
    Ok(())
}

#[test]
fn test_plain_jobs_have_no_check_capability() {
    let recorder = Recorder::new();
    let handle = JobHandle::new(TestJobBuilder::new("plain", &recorder).build());
    assert!(handle.read().as_check().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_log_producer_writes_nothing_to_output() -> TestResult {
    init_tracing();
    let recorder = Recorder::new();
    let (queue, _cancel) = started_queue(1);

    queue.put(TestJobBuilder::new("logged", &recorder).failing("noted").build())?;
    with_timeout(queue.wait()).await?;

    let mut producer = ProducerRegistry::with_builtins().create("log")?;
    let mut out = Vec::new();
    let verdict = produce_results(&*queue, producer.as_mut(), &mut out).await;

    assert!(out.is_empty());
    assert!(matches!(verdict, Err(EngineError::JobsFailed(_))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_check_renamed_before_submission() -> TestResult {
    init_tracing();
    let (queue, _cancel) = started_queue(1);

    let mut check = MockCheck::new("placeholder", true);
    check.set_id("memory-usage");
    queue.put(Box::new(check))?;
    with_timeout(queue.wait()).await?;

    assert!(queue.get("placeholder").is_none());
    let renamed = queue.get("memory-usage").expect("indexed under the new id");
    assert!(renamed.completed());
    assert_eq!(
        renamed.read().as_check().map(|c| c.output().name),
        Some("memory-usage".to_string())
    );
    Ok(())
}
