//! Actions and action collections.
//!
//! An [`Action`] is one opaque unit of rule logic. It receives the scheduler
//! (so it can start nested tasks, pause, issue requests or resume other
//! tasks) and the engine handle (so it can read and write game state).
//!
//! An [`ActionCollection`] is the immutable, ordered list of actions bound
//! to a task. It is backed by a persistent vector, so cloning it and
//! concatenating trigger actions around an event's main actions is cheap.
//!
//! ## Example
//!
//! ```
//! use ccg_sync::core::{Action, ActionCollection};
//!
//! struct Engine { log: Vec<&'static str> }
//!
//! let actions: ActionCollection<Engine> = ActionCollection::new()
//!     .then(Action::named("draw", |_sys, engine: &mut Engine| {
//!         engine.log.push("draw");
//!         Ok(())
//!     }))
//!     .then(Action::named("discard", |_sys, engine: &mut Engine| {
//!         engine.log.push("discard");
//!         Ok(())
//!     }));
//!
//! assert_eq!(actions.len(), 2);
//! assert_eq!(actions.get(1).map(|a| a.name()), Some("discard"));
//! ```

use std::rc::Rc;

use im::Vector;

use crate::error::ActionResult;
use crate::scheduler::SyncTriggerSystem;

/// Signature of an action body.
pub type ActionFn<E> = dyn Fn(&mut SyncTriggerSystem<E>, &mut E) -> ActionResult;

/// A single unit of rule logic.
///
/// Cloning an action is a reference-count bump.
pub struct Action<E> {
    name: &'static str,
    body: Rc<ActionFn<E>>,
}

impl<E> Action<E> {
    /// Create an unnamed action.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut SyncTriggerSystem<E>, &mut E) -> ActionResult + 'static,
    {
        Self::named("action", body)
    }

    /// Create an action with a label used in logs.
    pub fn named<F>(name: &'static str, body: F) -> Self
    where
        F: Fn(&mut SyncTriggerSystem<E>, &mut E) -> ActionResult + 'static,
    {
        Self {
            name,
            body: Rc::new(body),
        }
    }

    /// An action that does nothing.
    pub fn noop() -> Self {
        Self::named("noop", |_, _| Ok(()))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the action body.
    pub fn invoke(&self, system: &mut SyncTriggerSystem<E>, engine: &mut E) -> ActionResult {
        (self.body)(system, engine)
    }
}

impl<E> Clone for Action<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            body: Rc::clone(&self.body),
        }
    }
}

impl<E> std::fmt::Debug for Action<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Action({})", self.name)
    }
}

/// Ordered, immutable sequence of actions bound to one task.
pub struct ActionCollection<E> {
    actions: Vector<Action<E>>,
}

impl<E> ActionCollection<E> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            actions: Vector::new(),
        }
    }

    /// Append an action (builder pattern).
    #[must_use]
    pub fn then(mut self, action: Action<E>) -> Self {
        self.actions.push_back(action);
        self
    }

    /// Append a closure as an unnamed action (builder pattern).
    #[must_use]
    pub fn then_fn<F>(self, body: F) -> Self
    where
        F: Fn(&mut SyncTriggerSystem<E>, &mut E) -> ActionResult + 'static,
    {
        self.then(Action::new(body))
    }

    /// A new collection holding `self` followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &ActionCollection<E>) -> Self {
        let mut actions = self.actions.clone();
        actions.append(other.actions.clone());
        Self { actions }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Action<E>> {
        self.actions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action<E>> {
        self.actions.iter()
    }
}

impl<E> Default for ActionCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ActionCollection<E> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ActionCollection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.iter()).finish()
    }
}

impl<E> From<Action<E>> for ActionCollection<E> {
    fn from(action: Action<E>) -> Self {
        Self::new().then(action)
    }
}

impl<E> From<Vec<Action<E>>> for ActionCollection<E> {
    fn from(actions: Vec<Action<E>>) -> Self {
        actions.into_iter().collect()
    }
}

impl<E> FromIterator<Action<E>> for ActionCollection<E> {
    fn from_iter<I: IntoIterator<Item = Action<E>>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}
