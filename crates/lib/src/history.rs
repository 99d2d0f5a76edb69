//! Chat history: the ordered, append-only message sequence the UIs render.
//!
//! Messages are immutable once appended; the store never reorders,
//! deduplicates, or deletes. Mutation happens only from the UI/driver loop.

use serde::{Deserialize, Serialize};

/// Where a message came from: typed by the user, a plain agent reply, or a
/// rich card derived from an agent payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Agent,
    Card,
}

/// A single chat entry. `link` is empty when the message has no URL button;
/// `actions` holds quick-reply labels (0–3, card messages only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub actions: Vec<String>,
    pub origin: Origin,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: String::new(),
            actions: Vec::new(),
            origin: Origin::User,
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: String::new(),
            actions: Vec::new(),
            origin: Origin::Agent,
        }
    }

    pub fn card(text: impl Into<String>, link: impl Into<String>, actions: Vec<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
            actions,
            origin: Origin::Card,
        }
    }

    /// Quick-reply label at the given position, if the message has one.
    pub fn action(&self, index: usize) -> Option<&str> {
        self.actions.get(index).map(|s| s.as_str())
    }

    /// True when the message carries a URL button.
    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }
}

/// In-memory history store: append and read, nothing else.
#[derive(Debug, Default)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message at the end; order of appends is the order of display.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full sequence, oldest first, for display.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
