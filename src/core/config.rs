//! Scheduler configuration.
//!
//! Every peer in a synchronized game must run with the same configuration,
//! so the config is serializable and travels with the match setup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scheduler configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Priority used for triggers registered without a priority function.
    /// Higher values run earlier.
    pub default_trigger_priority: i32,

    /// Countdown for requests whose `RequestSpec` sets no timeout.
    pub default_request_timeout: Duration,

    /// Maximum depth of nested task runs (fresh or resumed).
    /// Exceeding it fails the run with `NestingTooDeep`.
    pub max_nesting_depth: usize,

    /// Record scheduler transitions in the journal.
    pub journal: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_trigger_priority: 0,
            default_request_timeout: Duration::from_secs(30),
            max_nesting_depth: 256,
            journal: true,
        }
    }
}

impl SchedulerConfig {
    /// Set the default trigger priority.
    #[must_use]
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_trigger_priority = priority;
        self
    }

    /// Set the default request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.default_request_timeout = timeout;
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_nesting(mut self, depth: usize) -> Self {
        assert!(depth > 0, "Nesting limit must allow at least one task");
        self.max_nesting_depth = depth;
        self
    }

    /// Enable or disable the journal.
    #[must_use]
    pub fn with_journal(mut self, enabled: bool) -> Self {
        self.journal = enabled;
        self
    }
}
