//! # ccg-sync
//!
//! Deterministic cooperative task scheduler for a networked card-game engine.
//!
//! ## Design Principles
//!
//! 1. **Replay, Not Snapshots**: Peers stay in sync by executing the same
//!    logical steps in the same order. Every ordering decision (task ids,
//!    trigger priority ties, paused set, pending requests, timer expiry)
//!    uses deterministic containers.
//!
//! 2. **Suspension Without Coroutines**: A task is a cursor over an
//!    immutable action list plus a state. Pausing takes effect at the next
//!    action boundary; resuming re-enters the loop at the cursor.
//!
//! 3. **Explicit Context**: Actions receive `&mut SyncTriggerSystem<E>` and
//!    the engine handle `&mut E`. There are no globals.
//!
//! ## Modules
//!
//! - `core`: Player and entity ids, event contexts, actions, configuration
//! - `tasks`: Task records and their states
//! - `triggers`: Prioritized, conditional trigger registry
//! - `requests`: Player requests, response outcomes and the countdown clock
//! - `scheduler`: `SyncTriggerSystem`, which owns and drives all of the above
//! - `journal`: Ordered log of scheduler transitions for replay comparison
//! - `error`: Scheduler and action errors

pub mod core;
pub mod error;
pub mod journal;
pub mod requests;
pub mod scheduler;
pub mod tasks;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionCollection, ActionFn,
    ContextValue, EventContext,
    EntityId, PlayerId,
    SchedulerConfig,
};

pub use crate::error::{ActionError, ActionResult, Result, SchedulerError};

pub use crate::journal::{Journal, JournalEntry, SchedulerEvent};

pub use crate::requests::{
    ManualTimer, PendingRequest, RequestSpec, ResponseOutcome, ResponsePolicy,
    TimerHandle, TimerSource, RESPONDER_KEY,
};

pub use crate::scheduler::SyncTriggerSystem;

pub use crate::tasks::{SyncTask, TaskId, TaskState};

pub use crate::triggers::{SyncTrigger, TriggerId, TriggerPhase, TriggerRegistry};
