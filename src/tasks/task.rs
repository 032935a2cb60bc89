//! The task node.

use serde::{Deserialize, Serialize};

use crate::core::{ActionCollection, EventContext};

/// Unique identifier for a task.
///
/// Ids are allocated in creation order and never reused, so comparing ids
/// compares creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Create a new task ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Execution state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Running,
    Paused,
    /// Terminal. Never re-entered.
    Finished,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// One node of the task tree.
///
/// Only the scheduler mutates state, cursor and links. Actions running as
/// the task may mutate its context.
pub struct SyncTask<E> {
    pub(crate) id: TaskId,
    pub(crate) state: TaskState,
    pub(crate) actions: ActionCollection<E>,
    pub(crate) cursor: usize,
    pub(crate) parent: Option<TaskId>,
    pub(crate) children: Vec<TaskId>,
    pub(crate) context: EventContext,
}

impl<E> SyncTask<E> {
    pub(crate) fn new(id: TaskId, context: EventContext, actions: ActionCollection<E>) -> Self {
        Self {
            id,
            state: TaskState::Running,
            actions,
            cursor: 0,
            parent: None,
            children: Vec::new(),
            context,
        }
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Index of the next action to evaluate.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn actions(&self) -> &ActionCollection<E> {
        &self.actions
    }

    /// The task that was current when this one started as a fresh run.
    #[must_use]
    pub fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Fresh nested runs started while this task was current, in order.
    #[must_use]
    pub fn children(&self) -> &[TaskId] {
        &self.children
    }

    #[must_use]
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// Task label (the context name).
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == TaskState::Paused
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }

    /// Actions not yet evaluated.
    #[must_use]
    pub fn remaining_actions(&self) -> usize {
        self.actions.len().saturating_sub(self.cursor)
    }
}

impl<E> std::fmt::Debug for SyncTask<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTask")
            .field("id", &self.id)
            .field("name", &self.context.name())
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("len", &self.actions.len())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}
