//! Content blocks exchanged with the model.
//!
//! A model reply is a list of blocks rather than a single string. Most replies
//! hold one `Text` block; when the model wants the host to run something it
//! returns a `ToolUse` block instead, and the client answers with a
//! `ToolResult` block in the next user message.
//!
//! These are provider-neutral. Each API client in [`crate::api`] translates
//! them to and from its own wire format.
//!
//! # Example
//!
//! ```rust
//! use shellchat::types::content::{ContentBlock, extract_tool_uses};
//! use serde_json::json;
//!
//! let reply = vec![
//!     ContentBlock::text("Let me check."),
//!     ContentBlock::tool_use("call_1", "execute_shell_command", json!({"command": "ls /tmp"})),
//! ];
//!
//! let calls = extract_tool_uses(&reply);
//! assert_eq!(calls[0].name, "execute_shell_command");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A content block in a conversation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },

    /// A request from the model to run a tool.
    ToolUse(ToolUseBlock),

    /// The output of a tool run, sent back to the model.
    ToolResult(ToolResultBlock),
}

impl ContentBlock {
    /// Creates a new text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a new tool_use content block.
    #[must_use]
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse(ToolUseBlock::new(id, name, input))
    }

    /// Extracts the text content if this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Extracts the tool_use block if this is a tool_use.
    #[must_use]
    pub fn as_tool_use(&self) -> Option<&ToolUseBlock> {
        match self {
            Self::ToolUse(block) => Some(block),
            _ => None,
        }
    }

    /// Extracts the tool_result block if this is a tool_result.
    #[must_use]
    pub fn as_tool_result(&self) -> Option<&ToolResultBlock> {
        match self {
            Self::ToolResult(block) => Some(block),
            _ => None,
        }
    }
}

impl From<ToolResultBlock> for ContentBlock {
    fn from(block: ToolResultBlock) -> Self {
        Self::ToolResult(block)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolUseBlock {
    /// Identifier of this call. Generated locally when the provider omits it.
    pub id: String,

    /// The name of the tool to call.
    pub name: String,

    /// The arguments as a JSON object.
    pub input: Value,

    /// Opaque provider token that must be echoed back with the call
    /// (Gemini `thoughtSignature`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolUseBlock {
    /// Creates a new tool use block.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
            signature: None,
        }
    }

    /// Attaches a provider signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }

    /// Returns a string argument by name.
    #[must_use]
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

/// The result of a tool run.
///
/// Carries both the call id (Anthropic matches on it) and the tool name
/// (Gemini matches on that).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResultBlock {
    /// The id of the tool_use this answers.
    pub tool_use_id: String,

    /// The name of the tool that ran.
    pub name: String,

    /// Output text.
    pub content: String,

    /// Whether the content describes a failure to run the tool at all.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResultBlock {
    /// Creates a result for a tool that ran.
    #[must_use]
    pub fn success(call: &ToolUseBlock, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates a result for a tool that did not run.
    #[must_use]
    pub fn error(call: &ToolUseBlock, error: impl Into<String>) -> Self {
        Self {
            tool_use_id: call.id.clone(),
            name: call.name.clone(),
            content: error.into(),
            is_error: true,
        }
    }
}

/// Extracts all tool_use blocks from a list of content blocks, in order.
#[must_use]
pub fn extract_tool_uses(content: &[ContentBlock]) -> Vec<&ToolUseBlock> {
    content
        .iter()
        .filter_map(ContentBlock::as_tool_use)
        .collect()
}

/// Concatenates all text blocks.
#[must_use]
pub fn extract_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join("")
}
