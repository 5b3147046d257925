//! Tool schemas advertised to the model.
//!
//! Without a declared tool the model can only describe commands in prose.
//! Each API client converts [`ToolDefinition`] to its provider's format
//! (`functionDeclarations` for Gemini, `tools[].input_schema` for Anthropic).
//!
//! # Example
//!
//! ```rust
//! use shellchat::api::tools::{shell_tool, SHELL_TOOL_NAME};
//!
//! let tool = shell_tool();
//! assert_eq!(tool.name, SHELL_TOOL_NAME);
//! assert_eq!(tool.input_schema["required"][0], "command");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name of the shell tool as the model sees it.
pub const SHELL_TOOL_NAME: &str = "execute_shell_command";

/// A tool definition sent with every model request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// The unique name of the tool.
    pub name: String,

    /// Human-readable description. The model uses this to decide when to call it.
    pub description: String,

    /// JSON Schema (`"type": "object"`) for the arguments.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Creates the `execute_shell_command` tool definition.
#[must_use]
pub fn shell_tool() -> ToolDefinition {
    ToolDefinition::new(
        SHELL_TOOL_NAME,
        "Executes a shell command in the environment and returns the output. \
         The command runs in the host's default shell, in the server's working \
         directory. Returns stdout on success, or the return code, stdout and \
         stderr on failure.",
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        }),
    )
}
