//! Bookkeeping for requests awaiting responses.

use std::rc::Rc;
use std::time::Duration;

use smallvec::SmallVec;

use crate::core::{EventContext, PlayerId};
use crate::tasks::TaskId;

use super::spec::{ResponsePolicy, ValidatorFn};
use super::timer::TimerHandle;

/// A paused request task together with its correlation data.
pub struct PendingRequest<E> {
    pub(crate) task: TaskId,
    pub(crate) targets: SmallVec<[PlayerId; 4]>,
    pub(crate) policy: ResponsePolicy,
    pub(crate) answered: SmallVec<[PlayerId; 4]>,
    pub(crate) timer: TimerHandle,
    pub(crate) timeout: Duration,
    pub(crate) validator: Option<Rc<ValidatorFn<E>>>,
}

impl<E> PendingRequest<E> {
    #[must_use]
    pub fn task(&self) -> TaskId {
        self.task
    }

    #[must_use]
    pub fn targets(&self) -> &[PlayerId] {
        &self.targets
    }

    #[must_use]
    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    /// Targets whose responses were accepted so far.
    #[must_use]
    pub fn answered(&self) -> &[PlayerId] {
        &self.answered
    }

    #[must_use]
    pub fn timer(&self) -> TimerHandle {
        self.timer
    }

    /// The countdown length the request was issued with.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Does this request still wait for `player`?
    #[must_use]
    pub fn awaits(&self, player: PlayerId) -> bool {
        self.targets.contains(&player) && !self.answered.contains(&player)
    }

    /// Run the validator on a merged context. No validator accepts everything.
    pub(crate) fn validate(&self, engine: &E, merged: &EventContext) -> bool {
        self.validator.as_ref().is_none_or(|f| f(engine, merged))
    }

    /// Record an accepted response. Returns `true` once the request is complete.
    pub(crate) fn record_answer(&mut self, player: PlayerId) -> bool {
        if !self.answered.contains(&player) {
            self.answered.push(player);
        }
        match self.policy {
            ResponsePolicy::Any => true,
            ResponsePolicy::All => self.targets.iter().all(|t| self.answered.contains(t)),
        }
    }
}

impl<E> std::fmt::Debug for PendingRequest<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("task", &self.task)
            .field("targets", &self.targets)
            .field("policy", &self.policy)
            .field("answered", &self.answered)
            .field("timer", &self.timer)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
