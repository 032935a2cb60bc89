//! Trigger registration and event dispatch.

use tracing::debug;

use crate::core::{ActionCollection, EntityId, EventContext};
use crate::error::Result;
use crate::tasks::TaskId;
use crate::triggers::{SyncTrigger, TriggerId, TriggerPhase};

use super::SyncTriggerSystem;

impl<E> SyncTriggerSystem<E> {
    /// Register a trigger that runs before `event`'s main actions.
    pub fn register_before(&mut self, event: &str, trigger: SyncTrigger<E>) -> TriggerId {
        self.triggers.register(TriggerPhase::Before, event, trigger)
    }

    /// Register a trigger that runs after `event`'s main actions.
    pub fn register_after(&mut self, event: &str, trigger: SyncTrigger<E>) -> TriggerId {
        self.triggers.register(TriggerPhase::After, event, trigger)
    }

    pub fn unregister_before(&mut self, event: &str, id: TriggerId) -> bool {
        self.triggers.unregister(TriggerPhase::Before, event, id)
    }

    pub fn unregister_after(&mut self, event: &str, id: TriggerId) -> bool {
        self.triggers.unregister(TriggerPhase::After, event, id)
    }

    /// Before-triggers of `event`, in registration order.
    #[must_use]
    pub fn triggers_before(&self, event: &str) -> Vec<(TriggerId, &SyncTrigger<E>)> {
        self.triggers.triggers(TriggerPhase::Before, event)
    }

    /// After-triggers of `event`, in registration order.
    #[must_use]
    pub fn triggers_after(&self, event: &str) -> Vec<(TriggerId, &SyncTrigger<E>)> {
        self.triggers.triggers(TriggerPhase::After, event)
    }

    /// Unregister every trigger owned by `owner`. Returns how many were removed.
    pub fn remove_triggers_for(&mut self, owner: EntityId) -> usize {
        self.triggers.remove_for_owner(owner)
    }

    pub fn set_trigger_enabled(&mut self, id: TriggerId, enabled: bool) -> bool {
        self.triggers.set_enabled(id, enabled)
    }

    /// Dispatch a named event.
    ///
    /// Before and after triggers registered under `context.name()` are both
    /// selected up front against the same engine state. The task runs the
    /// selected before-actions, then `main_actions`, then the selected
    /// after-actions, in a single task carrying `context`.
    pub fn do_event(
        &mut self,
        engine: &mut E,
        context: EventContext,
        main_actions: impl Into<ActionCollection<E>>,
    ) -> Result<TaskId> {
        self.ensure_depth()?;
        let default_priority = self.config.default_trigger_priority;

        let before = self
            .triggers
            .select(TriggerPhase::Before, &*engine, &context, default_priority);
        let after = self
            .triggers
            .select(TriggerPhase::After, &*engine, &context, default_priority);

        debug!(
            target: "ccg_sync",
            event = context.name(),
            before = before.len(),
            after = after.len(),
            "dispatching event"
        );

        let mut actions = ActionCollection::new();
        for (_, trigger_actions) in &before {
            actions = actions.concat(trigger_actions);
        }
        actions = actions.concat(&main_actions.into());
        for (_, trigger_actions) in &after {
            actions = actions.concat(trigger_actions);
        }

        self.do_task(engine, Some(context), actions)
    }

    /// Run a trigger's actions as a fresh task.
    ///
    /// Priority, condition, enablement and uses are not consulted. Without a
    /// context the task gets an empty one named after the trigger.
    pub fn do_trigger(
        &mut self,
        engine: &mut E,
        trigger: &SyncTrigger<E>,
        context: Option<EventContext>,
    ) -> Result<TaskId> {
        let context = context.unwrap_or_else(|| EventContext::new(trigger.name.clone()));
        self.do_task(engine, Some(context), trigger.actions().clone())
    }
}
