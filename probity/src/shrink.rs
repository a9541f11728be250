//! Greedy search for a minimal falsifying value.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::TestConfig;
use crate::distance::ShrinkingDistance;
use crate::shrinkable::{Shrinkable, Value};

/// Result of a shrinking operation
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Minimal value that still fails
    pub minimal: T,
    pub minimal_distance: ShrinkingDistance,
    /// Number of committed shrinking steps
    pub shrink_steps: usize,
    /// Number of candidates tested
    pub attempts: usize,
    /// Time spent shrinking
    pub shrink_duration: Duration,
    /// Whether shrinking reached a value none of whose candidates fail
    pub completed: bool,
}

/// Configuration for shrinking behavior
#[derive(Debug, Clone)]
pub struct ShrinkConfig {
    /// Maximum number of committed shrinking steps
    pub max_steps: usize,
    /// Timeout for shrinking process
    pub timeout: Duration,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ShrinkConfig {
    pub fn new(max_steps: usize, timeout: Duration) -> Self {
        Self { max_steps, timeout }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Default::default()
        }
    }
}

impl From<&TestConfig> for ShrinkConfig {
    fn from(config: &TestConfig) -> Self {
        Self::new(config.max_shrink_steps, config.shrink_timeout)
    }
}

/// Shrinking engine that coordinates the shrinking process
#[derive(Debug, Clone, Default)]
pub struct ShrinkEngine {
    config: ShrinkConfig,
}

impl ShrinkEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    /// Walks the shrink candidates of `shrinkable`, committing to the first
    /// candidate for which `falsifies` holds, until no candidate does.
    ///
    /// `shrinkable` itself is assumed to falsify the property.
    pub fn shrink<T, F>(&self, shrinkable: Shrinkable<T>, mut falsifies: F) -> ShrinkResult<T>
    where
        T: Value,
        F: FnMut(&T) -> bool,
    {
        let start_time = Instant::now();
        let original = shrinkable.value();
        let mut current = shrinkable;
        let mut shrink_steps = 0;
        let mut attempts = 0;
        let mut completed = true;

        'search: loop {
            if shrink_steps >= self.config.max_steps {
                warn!(steps = shrink_steps, "shrinking stopped at the step limit");
                completed = false;
                break;
            }
            for candidate in current.shrink() {
                if start_time.elapsed() >= self.config.timeout {
                    warn!(steps = shrink_steps, timeout = ?self.config.timeout, "shrinking timed out");
                    completed = false;
                    break 'search;
                }
                attempts += 1;
                if falsifies(&candidate.value()) {
                    shrink_steps += 1;
                    debug!(
                        step = shrink_steps,
                        distance = %candidate.distance(),
                        "committed shrink candidate"
                    );
                    current = candidate;
                    continue 'search;
                }
            }
            break;
        }

        ShrinkResult {
            original,
            minimal: current.value(),
            minimal_distance: current.distance(),
            shrink_steps,
            attempts,
            shrink_duration: start_time.elapsed(),
            completed,
        }
    }
}
