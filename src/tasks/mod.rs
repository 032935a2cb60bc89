//! Suspendable tasks.
//!
//! A [`SyncTask`] is a bookmark into an [`ActionCollection`](crate::core::ActionCollection):
//! a cursor plus a state. Suspension needs nothing more than that, because
//! pauses only take effect at action boundaries.
//!
//! Tasks are owned by the scheduler's arena and addressed by [`TaskId`].

mod task;

pub use task::{SyncTask, TaskId, TaskState};
