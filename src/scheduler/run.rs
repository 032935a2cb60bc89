//! Task run loop and lifecycle operations.
//!
//! One loop implements fresh runs, pauses and resumes:
//!
//! 1. If a task `C` is current, a resumed run pushes `C` on the resume
//!    stack; a fresh run becomes a child of `C`.
//! 2. The task becomes `Running` and current.
//! 3. From the cursor on, each step records the cursor, stops if the task
//!    was paused or finished by an earlier action, and otherwise invokes
//!    the action with the task as current.
//! 4. A completed loop marks the task `Finished`.
//!
//! On every exit "current" is handed back: a resumed run pops the resume
//! stack (or clears current at top level), a fresh run returns to its
//! parent. Resuming a task that was paused under an unrelated branch
//! therefore returns control to the resumer, not to that branch.

use tracing::{debug, trace, warn};

use crate::core::{ActionCollection, EventContext};
use crate::error::{Result, SchedulerError};
use crate::journal::SchedulerEvent;
use crate::tasks::{SyncTask, TaskId, TaskState};

use super::SyncTriggerSystem;

impl<E> SyncTriggerSystem<E> {
    /// Run an action collection as a fresh task.
    ///
    /// The task becomes a child of the current task, if any. Returns once the
    /// task finished or paused; inspect [`SyncTriggerSystem::task`] for which.
    pub fn do_task(
        &mut self,
        engine: &mut E,
        context: Option<EventContext>,
        actions: impl Into<ActionCollection<E>>,
    ) -> Result<TaskId> {
        self.ensure_depth()?;
        let id = self.spawn(context.unwrap_or_default(), actions.into());
        self.run(engine, id, false)
    }

    /// Pause the current task.
    ///
    /// Takes effect at the next action boundary: the action that calls this
    /// completes, the following one does not start.
    pub fn pause_task(&mut self, task: TaskId) -> Result<()> {
        if self.current != Some(task) {
            return Err(SchedulerError::NotCurrentTask {
                task,
                current: self.current,
            });
        }
        let t = self.task_mut(task)?;
        if t.state == TaskState::Finished {
            return Err(SchedulerError::TaskFinished(task));
        }
        t.state = TaskState::Paused;
        self.paused.insert(task);
        debug!(target: "ccg_sync", %task, "pause requested");
        Ok(())
    }

    /// Pause whatever task is current.
    pub fn pause_current(&mut self) -> Result<TaskId> {
        let Some(task) = self.current else {
            return Err(SchedulerError::NoCurrentTask);
        };
        self.pause_task(task)?;
        Ok(task)
    }

    /// Resume a paused task from its cursor.
    ///
    /// Returns `Ok(None)` if the task is not in the paused set (unknown,
    /// running, finished, or a request task).
    pub fn resume_task(&mut self, engine: &mut E, task: TaskId) -> Result<Option<TaskId>> {
        if !self.paused.contains(&task) {
            if self.tasks.contains_key(&task) {
                debug!(target: "ccg_sync", %task, "resume ignored: task is not paused");
            } else {
                warn!(target: "ccg_sync", %task, "resume ignored: unknown task");
            }
            return Ok(None);
        }
        self.ensure_depth()?;
        self.paused.remove(&task);

        if self.active.contains(&task) {
            // Paused and resumed before its loop reached the next boundary:
            // the pause never takes effect.
            self.task_mut(task)?.state = TaskState::Running;
            debug!(target: "ccg_sync", %task, "pause cancelled before taking effect");
            return Ok(Some(task));
        }

        self.run(engine, task, true).map(Some)
    }

    /// Stop a task unconditionally.
    ///
    /// Remaining actions never run. Removes the task from the paused set and
    /// from the pending-request table (cancelling its countdown). Returns
    /// `false` for unknown or already finished tasks.
    pub fn stop_task(&mut self, task: TaskId) -> bool {
        let Some(t) = self.tasks.get_mut(&task) else {
            warn!(target: "ccg_sync", %task, "stop ignored: unknown task");
            return false;
        };
        if t.state == TaskState::Finished {
            return false;
        }
        t.state = TaskState::Finished;
        self.paused.remove(&task);
        if let Some(request) = self.pending.remove(&task) {
            self.timer.cancel(request.timer);
            self.timers.remove(&request.timer);
        }
        debug!(target: "ccg_sync", %task, "stopped");
        self.record(SchedulerEvent::TaskStopped { task });
        true
    }

    /// Drop finished task records from the arena.
    ///
    /// A task is released only when it and every descendant have finished
    /// and none of them is executing. Returns how many records were dropped.
    pub fn release_finished(&mut self) -> usize {
        // Children always have larger ids than their parents, so walking
        // ids downwards settles every subtree before its root.
        let ids: Vec<TaskId> = self.tasks.keys().rev().copied().collect();
        let mut released = 0;
        for id in ids {
            let releasable = self.tasks.get(&id).is_some_and(|t| {
                t.state == TaskState::Finished
                    && !self.active.contains(&id)
                    && t.children.iter().all(|c| !self.tasks.contains_key(c))
            });
            if releasable {
                self.tasks.remove(&id);
                released += 1;
            }
        }
        if released > 0 {
            debug!(target: "ccg_sync", released, "released finished tasks");
        }
        released
    }

    pub(super) fn spawn(&mut self, context: EventContext, actions: ActionCollection<E>) -> TaskId {
        let id = TaskId::new(self.next_task_id);
        self.next_task_id += 1;
        self.tasks.insert(id, SyncTask::new(id, context, actions));
        id
    }

    /// Run or resume `id`. `resumed` must be true iff the task was paused.
    pub(super) fn run(&mut self, engine: &mut E, id: TaskId, resumed: bool) -> Result<TaskId> {
        let previous = self.current;
        let pushed = match previous {
            Some(current) if resumed => {
                self.resume_stack.push(current);
                true
            }
            Some(current) => {
                self.task_mut(current)?.children.push(id);
                false
            }
            None => false,
        };

        let task = self.task_mut(id)?;
        if !resumed {
            task.parent = previous;
        }
        task.state = TaskState::Running;
        let start = task.cursor;
        let len = task.actions.len();
        let event = if resumed {
            SchedulerEvent::TaskResumed { task: id, cursor: start }
        } else {
            SchedulerEvent::TaskStarted {
                task: id,
                parent: previous,
                name: task.context.name().to_string(),
                len,
            }
        };

        self.current = Some(id);
        self.active.push(id);
        debug!(target: "ccg_sync", task = %id, resumed, cursor = start, len, "running task");
        self.record(event);

        for index in start..len {
            let Some(task) = self.tasks.get_mut(&id) else {
                break;
            };
            task.cursor = index;
            if task.state != TaskState::Running {
                return Ok(self.leave(id, resumed, pushed));
            }
            let Some(action) = task.actions.get(index).cloned() else {
                break;
            };

            self.current = Some(id);
            trace!(
                target: "ccg_sync",
                task = %id,
                index,
                action = action.name(),
                "invoking action"
            );
            if let Err(source) = action.invoke(self, engine) {
                warn!(target: "ccg_sync", task = %id, index, error = %source, "action failed");
                self.record(SchedulerEvent::TaskFailed { task: id, index });
                self.leave(id, resumed, pushed);
                return Err(SchedulerError::ActionFailed { task: id, index, source });
            }
        }

        if let Some(task) = self.tasks.get_mut(&id) {
            task.cursor = len;
            // The last action may itself have paused or stopped the task.
            if task.state == TaskState::Running {
                task.state = TaskState::Finished;
                debug!(target: "ccg_sync", task = %id, "finished");
                self.record(SchedulerEvent::TaskFinished { task: id });
            }
        }
        Ok(self.leave(id, resumed, pushed))
    }

    /// Close a run frame and hand "current" back.
    fn leave(&mut self, id: TaskId, resumed: bool, pushed: bool) -> TaskId {
        self.active.pop();

        let (state, cursor, parent) = match self.tasks.get(&id) {
            Some(t) => (t.state, t.cursor, t.parent),
            None => (TaskState::Finished, 0, None),
        };
        if state == TaskState::Paused {
            debug!(target: "ccg_sync", task = %id, cursor, "paused");
            self.record(SchedulerEvent::TaskPaused { task: id, cursor });
        }

        self.current = if resumed {
            if pushed {
                self.resume_stack.pop()
            } else {
                None
            }
        } else {
            parent
        };
        id
    }
}
