//! Trigger registry.
//!
//! The registry stores triggers per phase and event name and produces the
//! ordered action lists `do_event` wraps around an event's main actions.
//! Rule code registers triggers when cards enter play and removes them by
//! owner when cards leave.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::{ActionCollection, EntityId, EventContext};

use super::trigger::{SyncTrigger, TriggerId, TriggerPhase};

struct Registration<E> {
    id: TriggerId,
    trigger: SyncTrigger<E>,
}

/// Registry for triggers.
///
/// Registrations under one event name are kept in registration order. That
/// order is the tie-breaker for equal priorities and therefore part of the
/// determinism contract: every peer must register in the same order.
pub struct TriggerRegistry<E> {
    before: FxHashMap<String, Vec<Registration<E>>>,
    after: FxHashMap<String, Vec<Registration<E>>>,

    /// Where each registration lives, for lookup by id.
    locations: FxHashMap<TriggerId, (TriggerPhase, String)>,

    /// Next trigger ID to allocate.
    next_id: u32,
}

impl<E> TriggerRegistry<E> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            before: FxHashMap::default(),
            after: FxHashMap::default(),
            locations: FxHashMap::default(),
            next_id: 1,
        }
    }

    fn table(&self, phase: TriggerPhase) -> &FxHashMap<String, Vec<Registration<E>>> {
        match phase {
            TriggerPhase::Before => &self.before,
            TriggerPhase::After => &self.after,
        }
    }

    fn table_mut(&mut self, phase: TriggerPhase) -> &mut FxHashMap<String, Vec<Registration<E>>> {
        match phase {
            TriggerPhase::Before => &mut self.before,
            TriggerPhase::After => &mut self.after,
        }
    }

    /// Register a trigger under an event name, returns its ID.
    pub fn register(
        &mut self,
        phase: TriggerPhase,
        event: &str,
        trigger: SyncTrigger<E>,
    ) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;

        debug!(target: "ccg_sync", %id, ?phase, event, name = %trigger.name, "registering trigger");

        self.table_mut(phase)
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, trigger });
        self.locations.insert(id, (phase, event.to_string()));
        id
    }

    /// Unregister a trigger from a phase and event.
    ///
    /// Returns `false` if no such registration exists there.
    pub fn unregister(&mut self, phase: TriggerPhase, event: &str, id: TriggerId) -> bool {
        match self.locations.get(&id) {
            Some((p, e)) if *p == phase && e == event => {}
            _ => return false,
        }
        self.remove(id).is_some()
    }

    /// Remove a registration wherever it lives.
    pub fn remove(&mut self, id: TriggerId) -> Option<SyncTrigger<E>> {
        let (phase, event) = self.locations.remove(&id)?;
        let table = self.table_mut(phase);
        let list = table.get_mut(&event)?;
        let index = list.iter().position(|r| r.id == id)?;
        let removed = list.remove(index);
        // Clean up empty vectors
        if list.is_empty() {
            table.remove(&event);
        }
        debug!(target: "ccg_sync", %id, ?phase, event = %event, "unregistered trigger");
        Some(removed.trigger)
    }

    /// Get a trigger by ID.
    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&SyncTrigger<E>> {
        let (phase, event) = self.locations.get(&id)?;
        self.table(*phase)
            .get(event)?
            .iter()
            .find(|r| r.id == id)
            .map(|r| &r.trigger)
    }

    /// Get a mutable trigger by ID.
    pub fn get_mut(&mut self, id: TriggerId) -> Option<&mut SyncTrigger<E>> {
        let (phase, event) = self.locations.get(&id)?.clone();
        self.table_mut(phase)
            .get_mut(&event)?
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| &mut r.trigger)
    }

    /// Triggers registered under an event, in registration order.
    #[must_use]
    pub fn triggers(&self, phase: TriggerPhase, event: &str) -> Vec<(TriggerId, &SyncTrigger<E>)> {
        self.table(phase)
            .get(event)
            .map(|list| list.iter().map(|r| (r.id, &r.trigger)).collect())
            .unwrap_or_default()
    }

    /// Select the triggers that fire for an event.
    ///
    /// Keeps triggers that can fire and whose condition holds, consumes one
    /// use from each, and returns their IDs and actions sorted by priority
    /// (descending), then by registration order.
    pub fn select(
        &mut self,
        phase: TriggerPhase,
        engine: &E,
        context: &EventContext,
        default_priority: i32,
    ) -> Vec<(TriggerId, ActionCollection<E>)> {
        let Some(list) = self.table_mut(phase).get_mut(context.name()) else {
            return Vec::new();
        };

        // Store (priority, trigger_id, index) for sorting
        let mut selected: Vec<(i32, TriggerId, usize)> = Vec::new();
        for (index, registration) in list.iter().enumerate() {
            let trigger = &registration.trigger;
            if !trigger.can_fire() || !trigger.holds(engine, context) {
                continue;
            }
            let priority = trigger.priority_of(engine, context, default_priority);
            selected.push((priority, registration.id, index));
        }

        // Sort by priority (descending), then by trigger_id (ascending) for stability
        selected.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        selected
            .into_iter()
            .map(|(_, id, index)| {
                let trigger = &mut list[index].trigger;
                trigger.use_trigger();
                (id, trigger.actions().clone())
            })
            .collect()
    }

    /// IDs of triggers owned by an entity, in registration order.
    #[must_use]
    pub fn triggers_for_owner(&self, owner: EntityId) -> Vec<TriggerId> {
        let mut ids: Vec<TriggerId> = self
            .before
            .values()
            .chain(self.after.values())
            .flatten()
            .filter(|r| r.trigger.owner == Some(owner))
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Remove all triggers owned by an entity. Returns how many were removed.
    pub fn remove_for_owner(&mut self, owner: EntityId) -> usize {
        let to_remove = self.triggers_for_owner(owner);
        let count = to_remove.len();
        for id in to_remove {
            self.remove(id);
        }
        count
    }

    /// Enable or disable a trigger. Returns `false` for unknown IDs.
    pub fn set_enabled(&mut self, id: TriggerId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(trigger) => {
                trigger.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Get total registration count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl<E> Default for TriggerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
