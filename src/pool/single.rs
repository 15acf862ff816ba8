// src/pool/single.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::pool::{Backoff, Runner, WorkerPool};
use crate::queue::Queue;

/// Runner with exactly one worker. Jobs execute one at a time.
#[derive(Debug)]
pub struct SingleRunner {
    pool: WorkerPool,
}

impl SingleRunner {
    pub fn new() -> Self {
        Self {
            pool: WorkerPool::new(1),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.pool = self.pool.with_backoff(backoff);
        self
    }
}

impl Default for SingleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for SingleRunner {
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
