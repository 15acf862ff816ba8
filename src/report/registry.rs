// src/report/registry.rs

//! Tag → constructor mapping for results producers.
//!
//! There is no implicit global registration. A process that wants the shared
//! registry calls [`init_producers`] once at startup; it installs the
//! built-in producers and is a no-op on later calls. Libraries and tests can
//! also build private [`ProducerRegistry`] values.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::errors::{EngineError, Result};
use crate::report::{LogProducer, ResultsProducer, SummaryProducer};

pub type ProducerFactory = fn() -> Box<dyn ResultsProducer>;

#[derive(Debug, Default)]
pub struct ProducerRegistry {
    factories: RwLock<HashMap<String, ProducerFactory>>,
}

static GLOBAL: OnceLock<ProducerRegistry> = OnceLock::new();

/// Install the process-wide registry with the built-in producers.
pub fn init_producers() -> &'static ProducerRegistry {
    GLOBAL.get_or_init(|| {
        debug!("initialising global results producer registry");
        ProducerRegistry::with_builtins()
    })
}

/// The process-wide registry, if [`init_producers`] has been called.
pub fn global_producers() -> Result<&'static ProducerRegistry> {
    GLOBAL.get().ok_or_else(|| {
        EngineError::Lifecycle(
            "results producer registry used before init_producers()".to_string(),
        )
    })
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `"summary"` and `"log"`.
    pub fn with_builtins() -> Self {
        let mut factories: HashMap<String, ProducerFactory> = HashMap::new();
        factories.insert("summary".to_string(), summary_producer as ProducerFactory);
        factories.insert("log".to_string(), log_producer as ProducerFactory);
        Self {
            factories: RwLock::new(factories),
        }
    }

    /// Register a producer under `tag`. Existing tags are never overwritten.
    pub fn register(&self, tag: &str, factory: ProducerFactory) -> Result<()> {
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);

        if factories.contains_key(tag) {
            warn!(tag, "results producer already registered; keeping existing factory");
            return Err(EngineError::DuplicateProducer(tag.to_string()));
        }

        factories.insert(tag.to_string(), factory);
        debug!(tag, "registered results producer");
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Result<ProducerFactory> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories
            .get(tag)
            .copied()
            .ok_or_else(|| EngineError::UnknownProducer(tag.to_string()))
    }

    /// Construct a fresh producer for `tag`.
    pub fn create(&self, tag: &str) -> Result<Box<dyn ResultsProducer>> {
        Ok(self.get(tag)?())
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut tags: Vec<String> = factories.keys().cloned().collect();
        tags.sort();
        tags
    }
}

fn summary_producer() -> Box<dyn ResultsProducer> {
    Box::new(SummaryProducer::new())
}

fn log_producer() -> Box<dyn ResultsProducer> {
    Box::new(LogProducer::new())
}
