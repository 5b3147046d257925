//! Common test utilities and fixtures for Shellchat.
//!
//! This module provides shared test infrastructure including:
//! - A scripted model backend that replays canned replies
//! - A command runner that records what it was asked to run
//! - A temporary-directory test context

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::json;
use shellchat::api::{ModelBackend, ModelReply, ToolDefinition};
use shellchat::error::ChatResult;
use shellchat::tools::CommandRunner;
use shellchat::types::{ContentBlock, Message};

/// Test context providing common setup for integration tests.
pub struct TestContext {
    /// Temporary directory for test file operations.
    pub temp_dir: tempfile::TempDir,
}

impl TestContext {
    /// Creates a new test context with a temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Returns the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Creates a file in the temporary directory with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write file");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Model backend
// ============================================================================

/// Replays a fixed list of replies and records every history it was sent.
///
/// Clones share state, so a test can keep one handle after giving the other
/// to a session. Once the script runs out it answers with an empty reply.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    replies: Rc<RefCell<VecDeque<ChatResult<ModelReply>>>>,
    requests: Rc<RefCell<Vec<Vec<Message>>>>,
    tools_seen: Rc<RefCell<Vec<String>>>,
}

impl ScriptedBackend {
    /// Creates a backend that answers with `replies` in order.
    pub fn new(replies: Vec<ChatResult<ModelReply>>) -> Self {
        Self {
            replies: Rc::new(RefCell::new(replies.into())),
            ..Self::default()
        }
    }

    /// Histories sent so far, one per request.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.borrow().clone()
    }

    /// Number of requests made.
    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Tool names offered on the last request.
    pub fn tools_seen(&self) -> Vec<String> {
        self.tools_seen.borrow().clone()
    }
}

impl ModelBackend for ScriptedBackend {
    async fn generate(
        &self,
        _system: Option<&str>,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> ChatResult<ModelReply> {
        self.requests.borrow_mut().push(history.to_vec());
        *self.tools_seen.borrow_mut() = tools.iter().map(|t| t.name.clone()).collect();
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::default()))
    }
}

// ============================================================================
// Command runner
// ============================================================================

/// Records commands instead of running them.
#[derive(Clone)]
pub struct RecordingRunner {
    commands: Rc<RefCell<Vec<String>>>,
    output: String,
}

impl RecordingRunner {
    /// Creates a runner that answers every command with `output`.
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            commands: Rc::default(),
            output: output.into(),
        }
    }

    /// Commands received so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str) -> String {
        self.commands.borrow_mut().push(command.to_string());
        self.output.clone()
    }
}

// ============================================================================
// Reply helpers
// ============================================================================

/// A plain text reply.
pub fn text_reply(text: &str) -> ChatResult<ModelReply> {
    Ok(ModelReply::new(vec![ContentBlock::text(text)]))
}

/// A reply requesting one shell command.
pub fn shell_reply(id: &str, command: &str) -> ChatResult<ModelReply> {
    Ok(ModelReply::new(vec![shell_call(id, command)]))
}

/// A reply requesting an arbitrary tool.
pub fn tool_reply(id: &str, name: &str) -> ChatResult<ModelReply> {
    Ok(ModelReply::new(vec![ContentBlock::tool_use(
        id,
        name,
        json!({}),
    )]))
}

/// A single `execute_shell_command` block.
pub fn shell_call(id: &str, command: &str) -> ContentBlock {
    ContentBlock::tool_use(id, "execute_shell_command", json!({ "command": command }))
}
