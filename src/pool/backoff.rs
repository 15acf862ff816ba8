// src/pool/backoff.rs

use std::time::Duration;

use crate::config::BackoffConfig;

/// Bounded exponential backoff for idle workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    /// Delay to use after `current` also came up empty.
    pub fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(5), Duration::from_millis(200))
    }
}

impl From<BackoffConfig> for Backoff {
    fn from(cfg: BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(cfg.initial_ms),
            Duration::from_millis(cfg.max_ms),
        )
    }
}
