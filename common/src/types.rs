use serde::{Deserialize, Serialize};

/// Which side of the conversation an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Lifecycle of an entry. Outgoing entries are `Sent` on creation; an Incoming
/// placeholder starts `Pending` and ends `Answered` or `Errored`, with no
/// further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Sent,
    Pending,
    Answered,
    Errored,
}

/// One rendered line in the conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub text: String,
    pub direction: Direction,
    pub status: EntryStatus,
}

impl ConversationEntry {
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direction: Direction::Outgoing,
            status: EntryStatus::Sent,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direction: Direction::Incoming,
            status: EntryStatus::Pending,
        }
    }

    pub fn is_errored(&self) -> bool {
        self.status == EntryStatus::Errored
    }
}
