//! Player requests, responses and timeouts.
//!
//! A request is a task that is paused from birth. It waits in the
//! scheduler's pending table until one of three things happens:
//!
//! - an accepted response finalizes it (`Finished`, timeout actions skipped)
//! - its countdown expires and its timeout actions run to completion
//! - rule code stops it, which also cancels the countdown
//!
//! The data types live here; the operations are methods on
//! [`SyncTriggerSystem`](crate::scheduler::SyncTriggerSystem).

mod pending;
mod spec;
mod timer;

pub use pending::PendingRequest;
pub use spec::{RequestSpec, ResponseOutcome, ResponsePolicy, ValidatorFn, RESPONDER_KEY};
pub use timer::{ManualTimer, TimerHandle, TimerSource};
