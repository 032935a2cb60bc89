//! Request issuance, response correlation and timeouts.

use std::time::Duration;

use tracing::{debug, warn};

use crate::core::{EventContext, PlayerId};
use crate::error::Result;
use crate::journal::SchedulerEvent;
use crate::requests::{PendingRequest, RequestSpec, ResponseOutcome, RESPONDER_KEY};
use crate::tasks::{TaskId, TaskState};

use super::SyncTriggerSystem;

impl<E> SyncTriggerSystem<E> {
    /// Issue a player request.
    ///
    /// The returned task is paused from birth: it holds the timeout actions
    /// and never runs unless its countdown expires. Its parent is the task
    /// current at issuance, but it is not added to that task's children.
    pub fn request(&mut self, spec: RequestSpec<E>) -> TaskId {
        let RequestSpec {
            targets,
            policy,
            context,
            timeout,
            timeout_actions,
            validator,
        } = spec;
        let timeout = timeout.unwrap_or(self.config.default_request_timeout);

        let id = self.spawn(context, timeout_actions);
        let parent = self.current;
        if let Some(task) = self.tasks.get_mut(&id) {
            task.state = TaskState::Paused;
            task.parent = parent;
        }

        let timer = self.timer.start(timeout);
        self.timers.insert(timer, id);

        debug!(target: "ccg_sync", task = %id, ?targets, ?policy, ?timeout, "request issued");
        self.record(SchedulerEvent::RequestIssued {
            task: id,
            targets: targets.to_vec(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        });

        self.pending.insert(
            id,
            PendingRequest {
                task: id,
                targets,
                policy,
                answered: Default::default(),
                timer,
                timeout,
                validator,
            },
        );
        id
    }

    /// Deliver a response from `responder`.
    ///
    /// Goes to the oldest pending request that still awaits `responder`.
    pub fn response(
        &mut self,
        engine: &mut E,
        responder: PlayerId,
        response: EventContext,
    ) -> Result<ResponseOutcome> {
        let target = self
            .pending
            .values()
            .find(|request| request.awaits(responder))
            .map(|request| request.task);

        match target {
            Some(task) => self.deliver(engine, task, responder, response),
            None => {
                debug!(target: "ccg_sync", %responder, "no pending request for responder");
                Ok(ResponseOutcome::NoPendingRequest)
            }
        }
    }

    /// Deliver a response to one specific request.
    pub fn respond_to(
        &mut self,
        engine: &mut E,
        task: TaskId,
        responder: PlayerId,
        response: EventContext,
    ) -> Result<ResponseOutcome> {
        let awaits = self.pending.get(&task).is_some_and(|r| r.awaits(responder));
        if !awaits {
            debug!(target: "ccg_sync", %task, %responder, "request does not await responder");
            return Ok(ResponseOutcome::NoPendingRequest);
        }
        self.deliver(engine, task, responder, response)
    }

    fn deliver(
        &mut self,
        engine: &mut E,
        task: TaskId,
        responder: PlayerId,
        response: EventContext,
    ) -> Result<ResponseOutcome> {
        self.ensure_depth()?;

        let mut merged = self.task_mut(task)?.context.clone();
        merged.merge(&response);
        merged.set(RESPONDER_KEY, responder);

        let Some(request) = self.pending.get_mut(&task) else {
            return Ok(ResponseOutcome::NoPendingRequest);
        };
        if !request.validate(&*engine, &merged) {
            debug!(target: "ccg_sync", %task, %responder, "response rejected");
            self.record(SchedulerEvent::ResponseRejected { task, responder });
            return Ok(ResponseOutcome::Rejected(task));
        }

        let complete = request.record_answer(responder);
        self.task_mut(task)?.context = merged;

        if !complete {
            debug!(target: "ccg_sync", %task, %responder, "response accepted, awaiting others");
            self.record(SchedulerEvent::ResponseWaiting { task, responder });
            return Ok(ResponseOutcome::Waiting(task));
        }

        if let Some(request) = self.pending.remove(&task) {
            self.timer.cancel(request.timer);
            self.timers.remove(&request.timer);
        }
        debug!(target: "ccg_sync", %task, %responder, "request completed");
        self.record(SchedulerEvent::ResponseAccepted { task, responder });

        // Skip the timeout actions; the run loop finalizes the task.
        let t = self.task_mut(task)?;
        t.cursor = t.actions.len();
        self.run(engine, task, true)?;
        Ok(ResponseOutcome::Accepted(task))
    }

    /// Advance the time source and fire every request that timed out.
    ///
    /// Fails without advancing when called past the nesting limit.
    pub fn advance_time(&mut self, engine: &mut E, elapsed: Duration) -> Result<Vec<TaskId>> {
        self.ensure_depth()?;
        self.timer.advance(elapsed);
        self.poll_timeouts(engine)
    }

    /// Fire every request whose countdown the time source reports expired.
    ///
    /// Requests fire in expiry order. Returns their tasks.
    ///
    /// If a timeout action fails, polling stops and the error is returned.
    /// Requests fired before the failure have completed and are journaled
    /// as `RequestTimedOut`. The remaining expired countdowns fire on the
    /// next poll.
    pub fn poll_timeouts(&mut self, engine: &mut E) -> Result<Vec<TaskId>> {
        // Run frames unwind on every exit, so depth holds for the whole loop.
        self.ensure_depth()?;
        let mut fired = Vec::new();
        while let Some(handle) = self.timer.next_expired() {
            let Some(task) = self.timers.remove(&handle) else {
                warn!(target: "ccg_sync", %handle, "expired timer matches no pending request");
                continue;
            };
            self.fire_timeout(engine, task)?;
            fired.push(task);
        }
        Ok(fired)
    }

    /// Expire a request now, regardless of its countdown.
    ///
    /// Returns `false` if `task` is not a pending request.
    pub fn expire_request(&mut self, engine: &mut E, task: TaskId) -> Result<bool> {
        let Some(timer) = self.pending.get(&task).map(|r| r.timer) else {
            return Ok(false);
        };
        self.ensure_depth()?;
        self.timer.cancel(timer);
        self.timers.remove(&timer);
        self.fire_timeout(engine, task)?;
        Ok(true)
    }

    fn fire_timeout(&mut self, engine: &mut E, task: TaskId) -> Result<()> {
        self.ensure_depth()?;
        if self.pending.remove(&task).is_none() {
            return Ok(());
        }
        debug!(target: "ccg_sync", %task, "request timed out");
        self.record(SchedulerEvent::RequestTimedOut { task });

        self.task_mut(task)?.cursor = 0;
        self.run(engine, task, true)?;
        Ok(())
    }

    /// Time left before a request times out. Zero if it is not pending.
    #[must_use]
    pub fn remaining_time(&self, task: TaskId) -> Duration {
        self.pending
            .get(&task)
            .map_or(Duration::ZERO, |r| self.timer.remaining(r.timer))
    }

    /// Snapshot of tasks awaiting responses, oldest first.
    #[must_use]
    pub fn request_tasks(&self) -> Vec<TaskId> {
        self.pending.keys().copied().collect()
    }

    /// Correlation data of a pending request.
    #[must_use]
    pub fn pending_request(&self, task: TaskId) -> Option<&PendingRequest<E>> {
        self.pending.get(&task)
    }
}
