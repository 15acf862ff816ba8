#![allow(dead_code)]

use std::sync::Arc;

use jobengine::queue::{LocalUnordered, Queue};
use tokio_util::sync::CancellationToken;

pub use jobengine_test_utils::builders::TestJobBuilder;
pub use jobengine_test_utils::deps::ScriptedDependency;
pub use jobengine_test_utils::jobs::{Gate, Recorder};
pub use jobengine_test_utils::{eventually, init_tracing, with_timeout};

/// A started queue with `workers` workers and the token it was started with.
pub fn started_queue(workers: usize) -> (Arc<LocalUnordered>, CancellationToken) {
    let queue = LocalUnordered::new(workers);
    let cancel = CancellationToken::new();
    queue.start(cancel.clone()).expect("queue starts");
    (queue, cancel)
}

/// Whether a runner's queue is the given queue instance.
pub fn same_queue(bound: &Arc<dyn Queue>, queue: &Arc<LocalUnordered>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(bound), Arc::as_ptr(queue))
}
