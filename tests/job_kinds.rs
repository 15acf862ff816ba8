mod common;
use crate::common::{init_tracing, started_queue, with_timeout};

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use jobengine::dependency::{Always, DependencyManager};
use jobengine::errors::JobError;
use jobengine::job::{FnJob, Job, JobBase, ShellJob};
use jobengine::queue::Queue;
use jobengine::types::{Format, JobType};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn test_job_base_aggregates_errors() {
    let mut base = JobBase::new("multi", JobType::new("test", 1));
    assert!(base.error().is_none());

    base.add_error(JobError::Failed("one".into()));
    assert_eq!(base.error(), Some(JobError::Failed("one".into())));

    base.add_error(JobError::Panicked("two".into()));
    let err = base.error().expect("errors recorded");
    assert!(matches!(&err, JobError::Multiple(errs) if errs.len() == 2));
    assert_eq!(err.to_string(), "one; job panicked: two");
}

#[test]
fn test_job_base_defaults() {
    let base = JobBase::new("plain", JobType::new("test", 2));
    assert_eq!(base.id(), "plain");
    assert!(!base.completed());
    assert_eq!(base.priority(), 0);
    assert_eq!(base.dependency().kind(), "always");
    assert!(base.dependency().edges().is_empty());
}

#[test]
fn test_job_type_display_and_format_parsing() {
    let jt = JobType::new("shell", 1).with_format(Format::Yaml);
    assert_eq!(jt.to_string(), "shell@v1 (yaml)");

    assert_eq!("YML".parse::<Format>(), Ok(Format::Yaml));
    assert_eq!("json".parse::<Format>(), Ok(Format::Json));
    assert!("xml".parse::<Format>().is_err());
    assert_eq!(Format::default(), Format::Json);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fn_jobs_run_once_and_keep_errors() -> TestResult {
    init_tracing();
    let runs = Arc::new(AtomicUsize::new(0));
    let (queue, _cancel) = started_queue(2);

    let counter = Arc::clone(&runs);
    queue.put(Box::new(FnJob::new("count", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })))?;
    queue.put(Box::new(
        FnJob::new("refuse", || Err(anyhow!("refused: {}", 42)))
            .with_dependency(Always::after(["count"])?)
            .with_priority(7),
    ))?;

    with_timeout(queue.wait()).await?;

    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let refuse = queue.get("refuse").expect("registered");
    assert_eq!(refuse.error(), Some(JobError::Failed("refused: 42".into())));
    assert_eq!(refuse.read().priority(), 7);
    assert_eq!(refuse.read().job_type().name, "fn");

    // A completed job is not run again.
    refuse.write().run();
    assert_eq!(refuse.error(), Some(JobError::Failed("refused: 42".into())));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_shell_job_captures_output() {
    init_tracing();
    let mut job = ShellJob::new("greet", "echo \"hello $WHO\"").env("WHO", "world");

    job.run();

    assert!(job.completed());
    assert!(job.error().is_none());
    assert_eq!(job.exit_code(), Some(0));
    assert_eq!(job.output().trim(), "hello world");
}

#[cfg(unix)]
#[test]
fn test_shell_job_in_working_dir() -> TestResult {
    init_tracing();
    let tmp = tempfile::TempDir::new()?;
    std::fs::write(tmp.path().join("marker.txt"), "found")?;

    let mut job = ShellJob::new("cat", "cat marker.txt").working_dir(tmp.path());
    job.run();

    assert!(job.error().is_none());
    assert_eq!(job.output(), "found");
    Ok(())
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shell_job_failure_is_recorded() -> TestResult {
    init_tracing();
    let (queue, _cancel) = started_queue(1);

    queue.put(Box::new(ShellJob::new("fails", "echo oops >&2; exit 3")))?;
    with_timeout(queue.wait()).await?;

    let job = queue.get("fails").expect("registered");
    assert!(job.completed());
    match job.error() {
        Some(JobError::Failed(msg)) => assert!(msg.contains("exited with status 3"), "{msg}"),
        other => panic!("expected Failed, got {:?}", other),
    }
    Ok(())
}
