//! Execution journal.
//!
//! Peers stay in sync by replaying the same logical steps, so the order of
//! scheduler transitions is the thing worth comparing when two peers
//! disagree. The journal records every transition with a sequence number.
//! It serializes with serde and encodes to bytes with bincode so a peer can
//! ship its log and the other side can find the first divergence.
//!
//! ```
//! use ccg_sync::journal::{Journal, SchedulerEvent};
//! use ccg_sync::tasks::TaskId;
//!
//! let mut ours = Journal::new();
//! ours.record(SchedulerEvent::TaskFinished { task: TaskId::new(1) });
//!
//! let bytes = ours.to_bytes().unwrap();
//! let theirs = Journal::from_bytes(&bytes).unwrap();
//! assert_eq!(ours.diverges_at(&theirs), None);
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::error::Result;
use crate::tasks::TaskId;

/// One scheduler transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// A fresh task began running.
    TaskStarted {
        task: TaskId,
        parent: Option<TaskId>,
        name: String,
        len: usize,
    },
    /// The task stopped at an action boundary in `Paused` state.
    TaskPaused { task: TaskId, cursor: usize },
    /// A paused task continued from `cursor`.
    TaskResumed { task: TaskId, cursor: usize },
    TaskFinished { task: TaskId },
    /// The task was cancelled by `stop_task`.
    TaskStopped { task: TaskId },
    /// Action `index` returned an error.
    TaskFailed { task: TaskId, index: usize },
    RequestIssued {
        task: TaskId,
        targets: Vec<PlayerId>,
        timeout_ms: u64,
    },
    ResponseAccepted { task: TaskId, responder: PlayerId },
    ResponseWaiting { task: TaskId, responder: PlayerId },
    ResponseRejected { task: TaskId, responder: PlayerId },
    RequestTimedOut { task: TaskId },
}

/// A journaled transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    pub event: SchedulerEvent,
}

/// Ordered log of scheduler transitions.
///
/// Backed by a persistent vector so snapshots are O(1).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    entries: Vector<JournalEntry>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition.
    pub fn record(&mut self, event: SchedulerEvent) {
        let seq = self.entries.len() as u64;
        self.entries.push_back(JournalEntry { seq, event });
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Just the events, in order.
    #[must_use]
    pub fn events(&self) -> Vec<SchedulerEvent> {
        self.entries.iter().map(|e| e.event.clone()).collect()
    }

    #[must_use]
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// First sequence number at which the two journals differ.
    ///
    /// A journal that is a strict prefix of the other diverges at its length.
    #[must_use]
    pub fn diverges_at(&self, other: &Journal) -> Option<u64> {
        let mismatch = self
            .entries
            .iter()
            .zip(other.entries.iter())
            .find(|(a, b)| a != b)
            .map(|(a, _)| a.seq);

        mismatch.or_else(|| {
            (self.entries.len() != other.entries.len())
                .then(|| self.entries.len().min(other.entries.len()) as u64)
        })
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bytes produced by [`Journal::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Journal {
        let mut journal = Journal::new();
        journal.record(SchedulerEvent::TaskStarted {
            task: TaskId::new(1),
            parent: None,
            name: "Use".to_string(),
            len: 2,
        });
        journal.record(SchedulerEvent::TaskPaused { task: TaskId::new(1), cursor: 1 });
        journal
    }

    #[test]
    fn test_sequence_numbers() {
        let journal = sample();
        let seqs: Vec<u64> = journal.entries().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(journal.last().map(|e| e.seq), Some(1));
    }

    #[test]
    fn test_diverges_at() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.diverges_at(&b), None);

        b.record(SchedulerEvent::TaskFinished { task: TaskId::new(1) });
        assert_eq!(a.diverges_at(&b), Some(2));

        let mut c = Journal::new();
        c.record(SchedulerEvent::TaskStopped { task: TaskId::new(1) });
        assert_eq!(a.diverges_at(&c), Some(0));
    }

    #[test]
    fn test_bytes_and_json() {
        let journal = sample();

        let decoded = Journal::from_bytes(&journal.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, journal);

        let json = serde_json::to_string(&journal).unwrap();
        let back: Journal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, journal);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(Journal::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
