// src/pool/mod.rs

//! Runners: the workers that execute jobs pulled from a queue.
//!
//! - [`Runner`] is the contract queues drive.
//! - [`SingleRunner`] runs one worker; [`LocalWorkers`] runs a fixed-size
//!   pool. Both delegate to the shared [`WorkerPool`] core.
//! - [`worker`] holds the per-worker loop and the fault boundary around job
//!   execution.
//! - [`backoff`] controls how long idle workers sleep between polls.

pub mod backoff;
pub mod local;
pub mod single;
pub mod worker;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{EngineError, Result};
use crate::queue::Queue;

pub use backoff::Backoff;
pub use local::LocalWorkers;
pub use single::SingleRunner;

/// Execution substrate bound to exactly one queue for its operating lifetime.
pub trait Runner: Send + Sync {
    fn started(&self) -> bool;

    /// Associate with a queue. Only allowed before [`Runner::start`].
    ///
    /// Runners keep a weak reference; the queue owns the runner, not the
    /// other way round.
    fn set_queue(&self, queue: Weak<dyn Queue>) -> Result<()>;

    /// Currently associated queue, if it is still alive.
    fn queue(&self) -> Option<Arc<dyn Queue>>;

    /// Spawn the workers. Idempotent.
    ///
    /// Cancelling `cancel` stops new dispatches; jobs already running finish.
    fn start(&self, cancel: CancellationToken) -> Result<()>;

    /// Stop dispatching, wait for in-flight jobs and for every worker to exit.
    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

#[derive(Default)]
struct PoolState {
    queue: Option<Weak<dyn Queue>>,
    started: bool,
    shutdown: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

/// Worker pool core shared by the runner variants.
pub struct WorkerPool {
    size: usize,
    backoff: Backoff,
    state: Mutex<PoolState>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            backoff: Backoff::default(),
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn started(&self) -> bool {
        self.lock().started
    }

    pub fn set_queue(&self, queue: Weak<dyn Queue>) -> Result<()> {
        let mut state = self.lock();
        if state.started {
            return Err(EngineError::Lifecycle(
                "cannot change the queue of a runner that has started".to_string(),
            ));
        }
        state.queue = Some(queue);
        Ok(())
    }

    pub fn queue(&self) -> Option<Arc<dyn Queue>> {
        self.lock().queue.as_ref().and_then(Weak::upgrade)
    }

    pub fn start(&self, cancel: CancellationToken) -> Result<()> {
        let mut state = self.lock();

        if state.started {
            debug!("runner already started; ignoring start request");
            return Ok(());
        }

        let queue = state
            .queue
            .clone()
            .ok_or_else(|| EngineError::Lifecycle("runner has no queue".to_string()))?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            EngineError::Lifecycle(format!("runner must be started inside a tokio runtime: {err}"))
        })?;

        // Child token: `close` stops this pool without cancelling the caller.
        let shutdown = cancel.child_token();

        for worker_id in 0..self.size {
            let handle = runtime.spawn(worker::run_worker(
                worker_id,
                queue.clone(),
                shutdown.clone(),
                self.backoff,
            ));
            state.handles.push(handle);
        }

        state.shutdown = Some(shutdown);
        state.started = true;
        info!(workers = self.size, "runner started");
        Ok(())
    }

    pub async fn close(&self) {
        let (shutdown, handles) = {
            let mut state = self.lock();
            (state.shutdown.clone(), std::mem::take(&mut state.handles))
        };

        if let Some(shutdown) = shutdown {
            shutdown.cancel();
        }

        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "worker task ended abnormally");
            }
        }

        debug!("runner closed");
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("backoff", &self.backoff)
            .field("started", &self.started())
            .finish_non_exhaustive()
    }
}
