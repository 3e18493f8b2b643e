//! Conversation types and the chat log
//!
//! The log is both the transcript shown on the page and the exact context
//! sent to the chat provider. Index 0 always holds the system prompt; after
//! that, user and assistant turns alternate.

use serde::{Deserialize, Serialize};

/// Number of characters kept in a sidebar summary
pub const SUMMARY_CHARS: usize = 50;

/// Marker appended to every sidebar summary
pub const SUMMARY_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Glyph shown next to a message in the sidebar history
    pub fn glyph(self) -> &'static str {
        match self {
            Role::User => "👤",
            Role::System | Role::Assistant => "🤖",
        }
    }
}

/// A completed exchange, borrowed from the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPair<'a> {
    pub user: &'a Message,
    pub assistant: &'a Message,
}

/// One line of the sidebar history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub glyph: &'static str,
    pub summary: String,
}

impl From<&Message> for SidebarEntry {
    fn from(message: &Message) -> Self {
        Self {
            glyph: message.role.glyph(),
            summary: summarize(&message.content),
        }
    }
}

/// Cut `text` to its first [`SUMMARY_CHARS`] characters and append the
/// ellipsis, whether or not anything was cut.
pub fn summarize(text: &str) -> String {
    let mut summary: String = text.chars().take(SUMMARY_CHARS).collect();
    summary.push_str(SUMMARY_ELLIPSIS);
    summary
}

/// Only built through [`Conversation::initialize`], so index 0 is always
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    system_prompt: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a log holding only the system prompt
    pub fn initialize(system_prompt: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            messages: vec![Message {
                role: Role::System,
                content: system_prompt.to_string(),
            }],
        }
    }

    /// Drop every turn, leaving the same single system message as
    /// [`Conversation::initialize`].
    pub fn clear(&mut self) {
        *self = Self::initialize(&self.system_prompt);
    }

    /// Append a user turn. Blank input must be rejected before this is called.
    pub fn add_user(&mut self, content: &str) {
        debug_assert!(!content.trim().is_empty(), "blank user turn");
        self.messages.push(Message {
            role: Role::User,
            content: content.to_string(),
        });
    }

    /// Append the reply to the preceding user turn
    pub fn add_assistant(&mut self, content: &str) {
        debug_assert!(self.is_awaiting_reply(), "assistant turn without user turn");
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.to_string(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the last message is a user turn with no reply yet
    pub fn is_awaiting_reply(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|m| m.role == Role::User)
    }

    /// Completed exchanges, oldest first.
    ///
    /// Recomputed from the log on every call. A trailing user turn without a
    /// reply is left out. Call `.rev()` for newest-first display order.
    pub fn paired_turns(&self) -> impl DoubleEndedIterator<Item = TurnPair<'_>> + ExactSizeIterator {
        self.messages[1..].chunks_exact(2).map(|pair| TurnPair {
            user: &pair[0],
            assistant: &pair[1],
        })
    }

    /// Sidebar lines for every message after the system prompt, in order
    pub fn sidebar_summaries(&self) -> impl Iterator<Item = SidebarEntry> + '_ {
        self.messages[1..].iter().map(SidebarEntry::from)
    }
}
