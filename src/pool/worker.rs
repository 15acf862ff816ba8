// src/pool/worker.rs

//! Worker loop and the fault boundary around job execution.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::JobError;
use crate::job::JobHandle;
use crate::pool::Backoff;
use crate::queue::Queue;

/// Pull-execute-complete loop for one worker.
///
/// Exits when `shutdown` fires or the queue has been dropped. A job that was
/// already dispatched is always executed and completed before exiting.
pub async fn run_worker(
    worker: usize,
    queue: Weak<dyn Queue>,
    shutdown: CancellationToken,
    backoff: Backoff,
) {
    debug!(worker, "worker started");
    let mut delay = backoff.initial;

    loop {
        if shutdown.is_cancelled() {
            break;
        }

        let Some(queue) = queue.upgrade() else {
            debug!(worker, "queue dropped; worker exiting");
            break;
        };

        match queue.next(&shutdown) {
            Some(job) => {
                delay = backoff.initial;
                execute_job(worker, &job).await;
                queue.complete(&job);
            }
            None => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = queue.work_available() => {}
                    _ = tokio::time::sleep(delay) => {
                        delay = backoff.next(delay);
                    }
                }
            }
        }
    }

    debug!(worker, "worker exited");
}

/// Run a job on the blocking pool.
///
/// Panics are caught and recorded on the job. The job always ends up marked
/// complete, whatever happened inside.
pub async fn execute_job(worker: usize, job: &JobHandle) {
    let id = job.id().to_string();
    info!(worker, job = %id, "running job");
    let started = Instant::now();

    let handle = job.clone();
    let joined = tokio::task::spawn_blocking(move || run_guarded(&handle)).await;

    if let Err(err) = joined {
        // Only reachable if the blocking task was cancelled by runtime
        // shutdown; panics are caught inside `run_guarded`.
        error!(worker, job = %id, error = %err, "job execution task failed");
        let mut guard = job.write();
        guard.add_error(JobError::Failed(format!("execution aborted: {err}")));
        guard.mark_complete();
        job.publish(&**guard);
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match job.error() {
        Some(err) => warn!(worker, job = %id, elapsed_ms, error = %err, "job finished with error"),
        None => info!(worker, job = %id, elapsed_ms, "job finished"),
    }
}

fn run_guarded(job: &JobHandle) {
    let mut guard = job.write();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| guard.run()));

    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());
        error!(job = %job.id(), panic = %message, "job panicked; recording as job error");
        guard.add_error(JobError::Panicked(message));
    }

    guard.mark_complete();
    job.publish(&**guard);
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
