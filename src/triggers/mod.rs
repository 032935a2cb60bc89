//! Trigger system for event-driven abilities.
//!
//! Triggers let cards and abilities react to named game events. A trigger is
//! registered against an event name and a [`TriggerPhase`]: `Before`
//! triggers run ahead of the event's main actions, `After` triggers follow
//! them. All of them run inside the event's single task and share its
//! [`EventContext`](crate::core::EventContext).
//!
//! ## Key Components
//!
//! - [`SyncTrigger`]: condition, priority and actions
//! - [`TriggerRegistry`]: storage, lookup and ordering
//!
//! ## Ordering
//!
//! Within a phase, triggers whose condition holds run in descending priority.
//! Equal priorities run in registration order. Every peer sees the same
//! order as long as registrations happen in the same order.

mod registry;
mod trigger;

pub use registry::TriggerRegistry;
pub use trigger::{ConditionFn, PriorityFn, SyncTrigger, TriggerId, TriggerPhase};
