//! Error types for the scheduler and for action bodies.
//!
//! Only programming errors surface as [`SchedulerError`]. Ordinary misuse
//! (resuming an unknown task, answering a request nobody issued) is reported
//! through `Option`/`bool`/[`ResponseOutcome`](crate::requests::ResponseOutcome)
//! results, and timeouts are a regular completion path.

use crate::tasks::TaskId;

/// Errors raised by scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// `pause_task` was called for a task that is not running as current.
    #[error("cannot pause {task}: current task is {current:?}")]
    NotCurrentTask {
        /// The task that was asked to pause.
        task: TaskId,
        /// The task that actually was current.
        current: Option<TaskId>,
    },

    /// `pause_current` was called while no task was running.
    #[error("no task is current")]
    NoCurrentTask,

    /// The task id was never allocated by this scheduler, or was released.
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    /// The operation needs a task that has not finished.
    #[error("{0} has already finished")]
    TaskFinished(TaskId),

    /// Fresh task nesting exceeded `SchedulerConfig::max_nesting_depth`.
    #[error("task nesting exceeded {limit} levels")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },

    /// An action returned an error. The task is left `Running` with its
    /// cursor on the failing action.
    #[error("action {index} of {task} failed: {source}")]
    ActionFailed {
        task: TaskId,
        index: usize,
        #[source]
        source: ActionError,
    },

    /// Journal encoding or decoding failed.
    #[error("journal encoding error: {0}")]
    Journal(#[from] bincode::Error),
}

/// Errors returned by action bodies.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A scheduler call made from inside the action failed.
    #[error(transparent)]
    Scheduler(Box<SchedulerError>),

    /// A game rule refused to proceed.
    #[error("rule violation: {0}")]
    Rule(String),

    /// Any other failure from the rule layer.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    /// Create a rule violation error.
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }
}

impl From<SchedulerError> for ActionError {
    fn from(err: SchedulerError) -> Self {
        Self::Scheduler(Box::new(err))
    }
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Result type returned by action bodies.
pub type ActionResult = std::result::Result<(), ActionError>;
