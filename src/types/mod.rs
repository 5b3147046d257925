//! Core type definitions for Shellchat.
//!
//! - [`config`] - Application configuration types
//! - [`content`] - Provider-neutral content blocks (text, tool calls, tool results)
//! - [`message`] - Messages, roles and chat turns
//!
//! # Re-exports
//!
//! ```
//! use shellchat::types::{ChatTurn, Config, ContentBlock, Message, Role};
//! ```

pub mod config;
pub mod content;
pub mod message;

pub use config::{Config, Provider};
pub use content::{ContentBlock, ToolResultBlock, ToolUseBlock};
pub use message::{ChatTurn, Message, Role};
