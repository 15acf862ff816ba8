// src/queue/local.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::job::{Job, JobHandle};
use crate::pool::{LocalWorkers, Runner};
use crate::queue::results::ResultsStream;
use crate::queue::state::{read_state, write_state, QueueState};
use crate::queue::{Queue, QueueStats};

/// In-process queue with unordered dispatch.
///
/// Any ready job may be handed out next; there is no FIFO or priority
/// guarantee. Suited to small batches of local work.
///
/// Locking:
/// - all scheduling data sits behind one `RwLock`; mutations take the write
///   side, lookups, stats and result streams the read side;
/// - the runner slot has its own lock, which `start` and `set_runner` hold
///   while checking and flipping the started flag;
/// - stats are republished on a `watch` channel while the state lock is held,
///   so `wait` and result streams never observe a torn update.
pub struct LocalUnordered {
    state: Arc<RwLock<QueueState>>,
    runner: RwLock<Arc<dyn Runner>>,
    started: AtomicBool,
    stats_tx: watch::Sender<QueueStats>,
    work: Notify,
    self_ref: Weak<LocalUnordered>,
}

impl LocalUnordered {
    /// Queue backed by a pool of `workers` workers (at least one).
    pub fn new(workers: usize) -> Arc<Self> {
        Self::build(Arc::new(LocalWorkers::new(workers)))
    }

    /// Queue sized and tuned from an [`EngineConfig`].
    pub fn from_config(cfg: &EngineConfig) -> Arc<Self> {
        let runner = LocalWorkers::new(cfg.workers).with_backoff(cfg.backoff.into());
        Self::build(Arc::new(runner))
    }

    /// Queue bound to an existing runner. Fails if the runner has already
    /// started, since it can no longer be re-associated.
    pub fn with_runner(runner: Arc<dyn Runner>) -> Result<Arc<Self>> {
        if runner.started() {
            return Err(EngineError::Lifecycle(
                "cannot bind a queue to a runner that has already started".to_string(),
            ));
        }
        Ok(Self::build(runner))
    }

    fn build(runner: Arc<dyn Runner>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<LocalUnordered>| {
            let queue: Weak<dyn Queue> = weak.clone();
            if let Err(err) = runner.set_queue(queue) {
                warn!(error = %err, "runner refused queue binding during construction");
            }

            let (stats_tx, _) = watch::channel(QueueStats::default());

            Self {
                state: Arc::new(RwLock::new(QueueState::new())),
                runner: RwLock::new(runner),
                started: AtomicBool::new(false),
                stats_tx,
                work: Notify::new(),
                self_ref: weak.clone(),
            }
        })
    }
}

impl fmt::Debug for LocalUnordered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalUnordered")
            .field("started", &self.started())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Queue for LocalUnordered {
    fn put(&self, job: Box<dyn Job>) -> Result<()> {
        let handle = JobHandle::new(job);
        let id = handle.id().to_string();

        {
            let mut state = write_state(&self.state);
            state.insert(handle)?;
            self.stats_tx.send_replace(state.stats());
        }

        debug!(job = %id, "job submitted");
        self.work.notify_waiters();
        Ok(())
    }

    fn get(&self, id: &str) -> Option<JobHandle> {
        read_state(&self.state).get(id)
    }

    fn next(&self, cancel: &CancellationToken) -> Option<JobHandle> {
        if cancel.is_cancelled() {
            return None;
        }

        let dispatch = {
            let mut state = write_state(&self.state);
            let dispatch = state.dispatch();
            if dispatch.job.is_some() || !dispatch.skipped.is_empty() {
                self.stats_tx.send_replace(state.stats());
            }
            dispatch
        };

        if !dispatch.skipped.is_empty() {
            let skipped: Vec<_> = dispatch.skipped.iter().map(|j| j.id()).collect();
            info!(?skipped, "completed jobs with passed dependencies without running them");
            self.work.notify_waiters();
        }

        if let Some(job) = &dispatch.job {
            debug!(job = %job.id(), "job dispatched");
        }

        dispatch.job
    }

    fn complete(&self, job: &JobHandle) {
        let outcome = {
            let mut state = write_state(&self.state);
            let outcome = state.complete(job.id());
            if let Ok(Some(_)) = outcome {
                self.stats_tx.send_replace(state.stats());
            }
            outcome
        };

        match outcome {
            Ok(Some(_)) => {
                debug!(job = %job.id(), "job completed");
                self.work.notify_waiters();
            }
            Ok(None) => {}
            Err(err) => warn!(job = %job.id(), error = %err, "cannot complete job"),
        }
    }

    fn force_complete(&self, id: &str) -> Result<()> {
        {
            let mut state = write_state(&self.state);
            state.force_complete(id)?;
            self.stats_tx.send_replace(state.stats());
        }

        info!(job = %id, "job force-completed without running");
        self.work.notify_waiters();
        Ok(())
    }

    fn started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn start(&self, cancel: CancellationToken) -> Result<()> {
        let runner = self.runner.write().unwrap_or_else(PoisonError::into_inner);

        if self.started() {
            debug!("queue already started; ignoring start request");
            return Ok(());
        }

        let bound_here = runner
            .queue()
            .is_some_and(|q| std::ptr::addr_eq(Arc::as_ptr(&q), self as *const Self));
        if !bound_here {
            return Err(EngineError::Lifecycle(
                "the queue's runner is bound to a different queue".to_string(),
            ));
        }

        runner.start(cancel)?;
        self.started.store(true, Ordering::Release);
        info!("queue started");
        Ok(())
    }

    fn results(&self) -> ResultsStream {
        ResultsStream::new(Arc::clone(&self.state), self.stats_tx.subscribe())
    }

    fn stats(&self) -> QueueStats {
        read_state(&self.state).stats()
    }

    fn runner(&self) -> Arc<dyn Runner> {
        Arc::clone(&self.runner.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn set_runner(&self, runner: Arc<dyn Runner>) -> Result<()> {
        let mut slot = self.runner.write().unwrap_or_else(PoisonError::into_inner);

        if self.started() {
            return Err(EngineError::Lifecycle(
                "cannot change the runner after the queue has started".to_string(),
            ));
        }

        let queue: Weak<dyn Queue> = self.self_ref.clone();
        runner.set_queue(queue)?;
        *slot = runner;
        debug!("queue runner replaced");
        Ok(())
    }

    fn work_available(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.work.notified())
    }

    fn wait(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if !self.started() {
                return Err(EngineError::Lifecycle(
                    "cannot wait on a queue that has not started".to_string(),
                ));
            }

            let mut rx = self.stats_tx.subscribe();
            let reached = rx.wait_for(QueueStats::is_idle).await.is_ok();
            if !reached {
                return Err(EngineError::Lifecycle(
                    "queue stats channel closed while waiting".to_string(),
                ));
            }
            Ok(())
        })
    }
}
