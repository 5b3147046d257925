//! Tool dispatch.
//!
//! The model names a tool; [`ToolRegistry`] maps that name to a
//! [`ToolHandler`]. The only handler shipped is [`ShellTool`], which hands the
//! `command` argument to a [`CommandRunner`].
//!
//! `CommandRunner` is the capability boundary: [`HostShell`] runs commands on
//! the host with no restrictions at all. Swapping in a sandboxed runner does
//! not touch the tool-call loop.

use std::collections::BTreeMap;

use futures::future::LocalBoxFuture;
use tracing::debug;

use crate::api::tools::{shell_tool, ToolDefinition, SHELL_TOOL_NAME};
use crate::error::{ChatError, ChatResult};
use crate::shell::ShellConfig;
use crate::types::content::ToolUseBlock;

/// Executes command strings and returns their text summary.
///
/// Implementations never fail: every problem is reported in the returned
/// text, which is what the model sees.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs one command.
    async fn run(&self, command: &str) -> String;
}

/// Runs commands through the host's default shell, unsandboxed.
#[derive(Debug, Clone, Default)]
pub struct HostShell {
    shell: ShellConfig,
}

impl HostShell {
    /// Creates a runner using the platform default shell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner using a specific shell.
    #[must_use]
    pub fn with_shell(shell: ShellConfig) -> Self {
        Self { shell }
    }
}

impl CommandRunner for HostShell {
    async fn run(&self, command: &str) -> String {
        self.shell.run(command).await
    }
}

/// A tool the model can call.
pub trait ToolHandler {
    /// The schema advertised to the model. Its `name` is the registry key.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ToolInvalidInput`] when the arguments are unusable.
    /// Failures of the tool itself are reported in the `Ok` text.
    fn call<'a>(&'a self, call: &'a ToolUseBlock) -> LocalBoxFuture<'a, ChatResult<String>>;
}

/// The `execute_shell_command` tool.
pub struct ShellTool<R> {
    runner: R,
}

impl<R: CommandRunner> ShellTool<R> {
    /// Creates the tool around a runner.
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ToolHandler for ShellTool<R> {
    fn definition(&self) -> ToolDefinition {
        shell_tool()
    }

    fn call<'a>(&'a self, call: &'a ToolUseBlock) -> LocalBoxFuture<'a, ChatResult<String>> {
        Box::pin(async move {
            let command = call.str_arg("command").ok_or_else(|| {
                ChatError::tool_invalid_input(SHELL_TOOL_NAME, "missing string argument 'command'")
            })?;
            let output = self.runner.run(command).await;
            debug!(tool = SHELL_TOOL_NAME, output_len = output.len(), "Tool finished");
            Ok(output)
        })
    }
}

/// Name-to-handler lookup for the tools offered to the model.
///
/// # Example
///
/// ```
/// use shellchat::tools::{HostShell, ShellTool, ToolRegistry};
///
/// let registry = ToolRegistry::new().with(ShellTool::new(HostShell::new()));
/// assert!(registry.get("execute_shell_command").is_some());
/// assert!(registry.get("read_file").is_none());
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    handlers: BTreeMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding only the shell tool backed by `runner`.
    #[must_use]
    pub fn shell<R: CommandRunner + 'static>(runner: R) -> Self {
        Self::new().with(ShellTool::new(runner))
    }

    /// Adds a handler, replacing any handler with the same name.
    #[must_use]
    pub fn with(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    /// Adds a handler, replacing any handler with the same name.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) {
        let name = handler.definition().name;
        self.handlers.insert(name, Box::new(handler));
    }

    /// Looks up a handler by tool name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.handlers.get(name).map(Box::as_ref)
    }

    /// Schemas of every registered tool, ordered by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.handlers.values().map(|h| h.definition()).collect()
    }

    /// Registered tool names, ordered.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Returns true if no tool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
