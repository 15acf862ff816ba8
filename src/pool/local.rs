// src/pool/local.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::pool::{Backoff, Runner, WorkerPool};
use crate::queue::Queue;

/// Fixed-size pool of workers executing jobs in parallel.
#[derive(Debug)]
pub struct LocalWorkers {
    pool: WorkerPool,
}

impl LocalWorkers {
    /// Pool of `size` workers; zero is bumped to one.
    pub fn new(size: usize) -> Self {
        Self {
            pool: WorkerPool::new(size),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.pool = self.pool.with_backoff(backoff);
        self
    }

    pub fn size(&self) -> usize {
        self.pool.size()
    }
}

impl Runner for LocalWorkers {
    fn started(&self) -> bool {
        self.pool.started()
    }

    fn set_queue(&self, queue: Weak<dyn Queue>) -> Result<()> {
        self.pool.set_queue(queue)
    }

    fn queue(&self) -> Option<Arc<dyn Queue>> {
        self.pool.queue()
    }

    fn start(&self, cancel: CancellationToken) -> Result<()> {
        self.pool.start(cancel)
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.pool.close())
    }
}
