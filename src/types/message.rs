//! Message, Role and ChatTurn types.
//!
//! `Message` is what the session stores and what the API clients translate to
//! the provider format. `ChatTurn` is what the chat page shows: one user
//! request and the final reply, with the tool rounds in between left out.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::content::{extract_text, ContentBlock};

/// A participant role in a conversation.
///
/// # Examples
///
/// ```
/// use shellchat::types::message::Role;
///
/// assert_eq!(Role::Assistant.to_string(), "assistant");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The chat user, and tool results sent on the user's behalf.
    User,
    /// The model.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Who sent it.
    pub role: Role,
    /// Text, tool calls or tool results.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Creates a user message holding a single text block.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::text(text)])
    }

    /// Returns the concatenated text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        extract_text(&self.content)
    }
}

/// One exchange as seen by the chat user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// What the user typed.
    pub user_message: String,
    /// What the chat displayed in reply.
    pub assistant_reply: String,
}

impl ChatTurn {
    /// Creates a new chat turn.
    #[must_use]
    pub fn new(user_message: impl Into<String>, assistant_reply: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            assistant_reply: assistant_reply.into(),
        }
    }
}
