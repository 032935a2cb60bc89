//! Countdown time source for request timeouts.
//!
//! The scheduler never reads a wall clock. Time enters only through a
//! [`TimerSource`], which the host advances explicitly: from a real frame
//! clock during live play, or from recorded timestamps during replay. Both
//! produce the same expiry order.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Handle for one running countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

/// A countdown time source.
pub trait TimerSource {
    /// Start a countdown of `timeout` from the current time.
    fn start(&mut self, timeout: Duration) -> TimerHandle;

    /// Time left before `handle` expires. Zero once expired, cancelled or unknown.
    fn remaining(&self, handle: TimerHandle) -> Duration;

    /// Stop a countdown. Its expiry will never be reported.
    fn cancel(&mut self, handle: TimerHandle);

    /// Move time forward, queuing every countdown that reaches zero.
    fn advance(&mut self, elapsed: Duration);

    /// Pop the next expired countdown, earliest deadline first.
    fn next_expired(&mut self) -> Option<TimerHandle>;

    /// Total time elapsed since the source was created.
    fn now(&self) -> Duration;
}

/// Deterministic countdown clock advanced by hand.
///
/// Expired handles are reported in deadline order; equal deadlines are
/// reported in start order.
///
/// ```
/// use std::time::Duration;
/// use ccg_sync::requests::{ManualTimer, TimerSource};
///
/// let mut timer = ManualTimer::new();
/// let slow = timer.start(Duration::from_secs(5));
/// let fast = timer.start(Duration::from_secs(2));
///
/// timer.advance(Duration::from_secs(3));
/// assert_eq!(timer.next_expired(), Some(fast));
/// assert_eq!(timer.next_expired(), None);
/// assert_eq!(timer.remaining(slow), Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_handle: u64,
    deadlines: BTreeMap<TimerHandle, Duration>,
    expired: VecDeque<TimerHandle>,
}

impl ManualTimer {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of countdowns still running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.deadlines.len()
    }
}

impl TimerSource for ManualTimer {
    fn start(&mut self, timeout: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.deadlines.insert(handle, self.now + timeout);
        handle
    }

    fn remaining(&self, handle: TimerHandle) -> Duration {
        self.deadlines
            .get(&handle)
            .map_or(Duration::ZERO, |deadline| deadline.saturating_sub(self.now))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.deadlines.remove(&handle);
        self.expired.retain(|h| *h != handle);
    }

    fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;

        let mut due: Vec<(Duration, TimerHandle)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= self.now)
            .map(|(handle, deadline)| (*deadline, *handle))
            .collect();
        due.sort_unstable();

        for (_, handle) in due {
            self.deadlines.remove(&handle);
            self.expired.push_back(handle);
        }
    }

    fn next_expired(&mut self) -> Option<TimerHandle> {
        self.expired.pop_front()
    }

    fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_counts_down() {
        let mut timer = ManualTimer::new();
        let h = timer.start(Duration::from_secs(3));

        assert_eq!(timer.remaining(h), Duration::from_secs(3));
        timer.advance(Duration::from_secs(1));
        assert_eq!(timer.remaining(h), Duration::from_secs(2));
        assert_eq!(timer.next_expired(), None);

        timer.advance(Duration::from_secs(2));
        assert_eq!(timer.remaining(h), Duration::ZERO);
        assert_eq!(timer.next_expired(), Some(h));
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_equal_deadlines_in_start_order() {
        let mut timer = ManualTimer::new();
        let a = timer.start(Duration::from_secs(1));
        let b = timer.start(Duration::from_secs(1));

        timer.advance(Duration::from_secs(1));
        assert_eq!(timer.next_expired(), Some(a));
        assert_eq!(timer.next_expired(), Some(b));
    }

    #[test]
    fn test_cancel_removes_queued_expiry() {
        let mut timer = ManualTimer::new();
        let a = timer.start(Duration::from_secs(1));
        let b = timer.start(Duration::from_secs(2));

        timer.advance(Duration::from_secs(5));
        timer.cancel(a);

        assert_eq!(timer.next_expired(), Some(b));
        assert_eq!(timer.next_expired(), None);
    }

    #[test]
    fn test_zero_timeout_expires_on_next_advance() {
        let mut timer = ManualTimer::new();
        let h = timer.start(Duration::ZERO);

        timer.advance(Duration::ZERO);
        assert_eq!(timer.next_expired(), Some(h));
        assert_eq!(timer.now(), Duration::ZERO);
    }
}
