//! Conversation-related types.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// The author of a conversation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Spoken by the user.
    User,
    /// Replied by the assistant.
    Assistant,
}

/// One exchange item in the conversation.
#[derive(Clone, Debug)]
pub struct Entry {
    /// The author of this entry.
    pub role: Role,
    /// The transcript or reply text.
    pub content: String,
    /// When the entry was recorded.
    pub timestamp: SystemTime,
}

/// Represents a conversation.
///
/// Entries are ordered most-recent-last and live only in memory for the
/// lifetime of the owning controller.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    entries: Vec<Entry>,
}

impl Conversation {
    /// How many trailing entries are sent to the relay as context.
    pub const CONTEXT_LIMIT: usize = 10;

    /// How many trailing entries a presentation layer should display.
    pub const DISPLAY_LIMIT: usize = 6;

    /// Appends an entry spoken by the user.
    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.push(Role::User, content.into());
    }

    /// Appends an entry replied by the assistant.
    pub fn push_assistant<S: Into<String>>(&mut self, content: S) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.entries.push(Entry {
            role,
            content,
            timestamp: SystemTime::now(),
        });
    }

    /// Returns the last [`Self::CONTEXT_LIMIT`] entries as role/content
    /// pairs, timestamps stripped, for use as relay context.
    pub fn context(&self) -> Vec<(Role, String)> {
        self.tail(Self::CONTEXT_LIMIT)
            .iter()
            .map(|entry| (entry.role, entry.content.clone()))
            .collect()
    }

    /// Returns at most the `limit` most recent entries.
    #[inline]
    pub fn tail(&self, limit: usize) -> &[Entry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    /// Returns the most recent entry, if any.
    #[inline]
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Returns the number of entries in the conversation.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the conversation has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
