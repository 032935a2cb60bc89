//! Trigger definitions.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{ActionCollection, EntityId, EventContext};

/// Condition predicate evaluated against the engine and the event context.
pub type ConditionFn<E> = dyn Fn(&E, &EventContext) -> bool;

/// Priority function. Higher values run earlier.
pub type PriorityFn<E> = dyn Fn(&E, &EventContext) -> i32;

/// Unique identifier for a trigger registration.
///
/// Allocated in registration order; ties in priority are broken by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// Whether a trigger runs before or after an event's main actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerPhase {
    Before,
    After,
}

/// A conditional, prioritized bundle of actions.
///
/// ## Example
///
/// ```
/// use ccg_sync::core::{Action, EntityId};
/// use ccg_sync::triggers::SyncTrigger;
///
/// struct Engine { armor: i64 }
///
/// // "Before damage: if the target has armor, reduce damage by 1"
/// let trigger = SyncTrigger::new("Armor", Action::named("reduce", |sys, _engine: &mut Engine| {
///         if let Some(task) = sys.current_task() {
///             if let Some(ctx) = sys.context_mut(task) {
///                 ctx.add_int("amount", -1);
///             }
///         }
///         Ok(())
///     }))
///     .with_owner(EntityId(10))
///     .with_condition(|engine: &Engine, _ctx| engine.armor > 0)
///     .with_priority(5);
///
/// assert_eq!(trigger.priority_of(&Engine { armor: 1 }, &Default::default(), 0), 5);
/// assert!(!trigger.holds(&Engine { armor: 0 }, &Default::default()));
/// ```
pub struct SyncTrigger<E> {
    /// Human-readable name (for logs).
    pub name: String,

    /// The game object that registered this trigger, if any.
    pub owner: Option<EntityId>,

    /// Is this trigger currently active?
    pub enabled: bool,

    /// How many more times can this trigger be selected? `None` = unlimited.
    pub uses_remaining: Option<u32>,

    priority: Option<Rc<PriorityFn<E>>>,
    condition: Option<Rc<ConditionFn<E>>>,
    actions: ActionCollection<E>,
}

impl<E> SyncTrigger<E> {
    /// Create an unconditional trigger with default priority.
    pub fn new(name: impl Into<String>, actions: impl Into<ActionCollection<E>>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            enabled: true,
            uses_remaining: None,
            priority: None,
            condition: None,
            actions: actions.into(),
        }
    }

    /// Set the owning entity (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set a constant priority (builder pattern).
    #[must_use]
    pub fn with_priority(self, priority: i32) -> Self {
        self.with_priority_fn(move |_, _| priority)
    }

    /// Set a priority function (builder pattern).
    #[must_use]
    pub fn with_priority_fn<F>(mut self, priority: F) -> Self
    where
        F: Fn(&E, &EventContext) -> i32 + 'static,
    {
        self.priority = Some(Rc::new(priority));
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&E, &EventContext) -> bool + 'static,
    {
        self.condition = Some(Rc::new(condition));
        self
    }

    /// Set limited uses (builder pattern).
    #[must_use]
    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses_remaining = Some(uses);
        self
    }

    #[must_use]
    pub fn actions(&self) -> &ActionCollection<E> {
        &self.actions
    }

    /// Evaluate the priority, falling back to `default` when none is set.
    #[must_use]
    pub fn priority_of(&self, engine: &E, context: &EventContext, default: i32) -> i32 {
        self.priority.as_ref().map_or(default, |f| f(engine, context))
    }

    /// Evaluate the condition. Triggers without one always hold.
    #[must_use]
    pub fn holds(&self, engine: &E, context: &EventContext) -> bool {
        self.condition.as_ref().is_none_or(|f| f(engine, context))
    }

    /// Check if this trigger can fire (enabled and has uses).
    #[must_use]
    pub fn can_fire(&self) -> bool {
        self.enabled && self.uses_remaining.is_none_or(|u| u > 0)
    }

    /// Consume one use of this trigger.
    pub fn use_trigger(&mut self) {
        if let Some(ref mut uses) = self.uses_remaining {
            *uses = uses.saturating_sub(1);
        }
    }
}

impl<E> Clone for SyncTrigger<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            owner: self.owner,
            enabled: self.enabled,
            uses_remaining: self.uses_remaining,
            priority: self.priority.clone(),
            condition: self.condition.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<E> std::fmt::Debug for SyncTrigger<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTrigger")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("enabled", &self.enabled)
            .field("uses_remaining", &self.uses_remaining)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}
