//! Core types: ids, actions, event contexts, configuration.
//!
//! These are the leaves every other module builds on. Nothing here knows
//! about scheduling order; that lives in [`crate::scheduler`].

pub mod action;
pub mod config;
pub mod context;
pub mod entity;
pub mod player;

pub use action::{Action, ActionCollection, ActionFn};
pub use config::SchedulerConfig;
pub use context::{ContextValue, EventContext};
pub use entity::EntityId;
pub use player::PlayerId;
