//! Shellchat
//!
//! A single-session web chat in front of a language model that may run shell
//! commands on the host through one tool, `execute_shell_command`.
//!
//! This library exposes the core types and functionality for testing and extension.

pub mod api;
pub mod app;
pub mod error;
pub mod session;
pub mod shell;
pub mod tools;
pub mod types;
pub mod web;

// Re-export core types for convenient access
pub use app::ChatApp;
pub use error::{ChatError, ChatResult};
pub use types::{ChatTurn, Config, Message, Role};
