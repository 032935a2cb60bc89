//! The scheduler: task runs, event dispatch and request correlation.
//!
//! [`SyncTriggerSystem`] owns every piece of scheduling state: the task
//! arena, the "current task" cursor, the resume stack, the paused set, the
//! trigger registry and the pending-request table. Actions receive `&mut`
//! access to it, so all reentrant calls (nested tasks, pauses, resumes,
//! requests) go through the same owner and are ordered by the call stack.
//!
//! ## Example
//!
//! ```
//! use ccg_sync::core::{Action, ActionCollection, EventContext};
//! use ccg_sync::scheduler::SyncTriggerSystem;
//! use ccg_sync::tasks::TaskState;
//!
//! #[derive(Default)]
//! struct Engine { log: Vec<&'static str> }
//!
//! let mut system = SyncTriggerSystem::new();
//! let mut engine = Engine::default();
//!
//! let actions = ActionCollection::new()
//!     .then(Action::new(|_, e: &mut Engine| { e.log.push("cost"); Ok(()) }))
//!     .then(Action::new(|sys, e: &mut Engine| {
//!         e.log.push("wait");
//!         sys.pause_current()?;
//!         Ok(())
//!     }))
//!     .then(Action::new(|_, e: &mut Engine| { e.log.push("effect"); Ok(()) }));
//!
//! let task = system.do_task(&mut engine, Some(EventContext::new("Use")), actions).unwrap();
//! assert_eq!(engine.log, vec!["cost", "wait"]);
//! assert_eq!(system.task(task).map(|t| t.state()), Some(TaskState::Paused));
//!
//! system.resume_task(&mut engine, task).unwrap();
//! assert_eq!(engine.log, vec!["cost", "wait", "effect"]);
//! assert_eq!(system.task(task).map(|t| t.state()), Some(TaskState::Finished));
//! ```

mod dispatch;
mod requests;
mod run;

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::core::{EventContext, SchedulerConfig};
use crate::error::{Result, SchedulerError};
use crate::journal::{Journal, SchedulerEvent};
use crate::requests::{ManualTimer, PendingRequest, TimerHandle, TimerSource};
use crate::tasks::{SyncTask, TaskId};
use crate::triggers::TriggerRegistry;

/// Deterministic cooperative scheduler.
///
/// `E` is the engine handle passed to every action, condition, priority
/// and validator. It is opaque to the scheduler.
pub struct SyncTriggerSystem<E> {
    config: SchedulerConfig,

    /// Task arena. Ids are allocated in creation order.
    tasks: BTreeMap<TaskId, SyncTask<E>>,
    next_task_id: u64,

    /// The task presently executing, if any.
    current: Option<TaskId>,

    /// Tasks that were current when a paused task was resumed under them.
    resume_stack: Vec<TaskId>,

    /// Tasks whose run loop is on the native call stack, outermost first.
    active: Vec<TaskId>,

    /// Tasks paused by `pause_task`. Request tasks are never in here.
    paused: BTreeSet<TaskId>,

    triggers: TriggerRegistry<E>,

    /// Requests awaiting responses, oldest first.
    pending: BTreeMap<TaskId, PendingRequest<E>>,
    timers: FxHashMap<TimerHandle, TaskId>,
    timer: Box<dyn TimerSource>,

    journal: Journal,
}

impl<E> SyncTriggerSystem<E> {
    /// Create a scheduler with default configuration and a [`ManualTimer`].
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            tasks: BTreeMap::new(),
            next_task_id: 1,
            current: None,
            resume_stack: Vec::new(),
            active: Vec::new(),
            paused: BTreeSet::new(),
            triggers: TriggerRegistry::new(),
            pending: BTreeMap::new(),
            timers: FxHashMap::default(),
            timer: Box::new(ManualTimer::new()),
            journal: Journal::new(),
        }
    }

    /// Replace the time source (builder pattern).
    ///
    /// Must be called before any request is issued.
    #[must_use]
    pub fn with_timer_source(mut self, timer: impl TimerSource + 'static) -> Self {
        debug_assert!(self.pending.is_empty(), "time source swapped with requests pending");
        self.timer = Box::new(timer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The task presently executing, or `None` between suspensions.
    #[must_use]
    pub fn current_task(&self) -> Option<TaskId> {
        self.current
    }

    /// Look up a task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&SyncTask<E>> {
        self.tasks.get(&id)
    }

    /// A task's context.
    #[must_use]
    pub fn context(&self, id: TaskId) -> Option<&EventContext> {
        self.tasks.get(&id).map(|t| &t.context)
    }

    /// A task's context, for writing.
    pub fn context_mut(&mut self, id: TaskId) -> Option<&mut EventContext> {
        self.tasks.get_mut(&id).map(|t| &mut t.context)
    }

    /// Context of the current task.
    #[must_use]
    pub fn current_context(&self) -> Option<&EventContext> {
        self.current.and_then(|id| self.context(id))
    }

    /// Context of the current task, for writing.
    pub fn current_context_mut(&mut self) -> Option<&mut EventContext> {
        let id = self.current?;
        self.context_mut(id)
    }

    /// Snapshot of the paused-task set, in creation order.
    #[must_use]
    pub fn paused_tasks(&self) -> Vec<TaskId> {
        self.paused.iter().copied().collect()
    }

    /// Is the task's run loop somewhere on the call stack?
    #[must_use]
    pub fn is_executing(&self, id: TaskId) -> bool {
        self.active.contains(&id)
    }

    /// Number of task records held in the arena.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn triggers(&self) -> &TriggerRegistry<E> {
        &self.triggers
    }

    pub fn triggers_mut(&mut self) -> &mut TriggerRegistry<E> {
        &mut self.triggers
    }

    #[must_use]
    pub fn timer(&self) -> &dyn TimerSource {
        self.timer.as_ref()
    }

    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Take the journal, leaving an empty one.
    pub fn take_journal(&mut self) -> Journal {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, event: SchedulerEvent) {
        if self.config.journal {
            self.journal.record(event);
        }
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut SyncTask<E>> {
        self.tasks.get_mut(&id).ok_or(SchedulerError::UnknownTask(id))
    }

    fn ensure_depth(&self) -> Result<()> {
        if self.active.len() >= self.config.max_nesting_depth {
            return Err(SchedulerError::NestingTooDeep {
                limit: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }
}

impl<E> Default for SyncTriggerSystem<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for SyncTriggerSystem<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTriggerSystem")
            .field("current", &self.current)
            .field("tasks", &self.tasks.len())
            .field("paused", &self.paused)
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("resume_stack", &self.resume_stack)
            .field("triggers", &self.triggers.len())
            .finish_non_exhaustive()
    }
}
