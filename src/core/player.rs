//! Player identification.
//!
//! Players are the only external parties the scheduler talks to: requests
//! are addressed to one or more `PlayerId`s and responses arrive tagged with
//! the responding player's id.

use serde::{Deserialize, Serialize};

/// Responder identifier, as assigned by the match setup.
///
/// Ordered so pending-request bookkeeping iterates responders the same way
/// on every peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for PlayerId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player({})", self.0)
    }
}
