//! Centralized error types for Shellchat.
//!
//! Every failure inside a chat turn is represented by [`ChatError`]. None of
//! them is fatal: the tool-call loop renders each one into the text shown in
//! the chat via [`ChatError::user_message`].
//!
//! # Example
//!
//! ```
//! use shellchat::error::{ChatError, ChatResult};
//!
//! fn lookup(name: &str) -> ChatResult<()> {
//!     if name != "execute_shell_command" {
//!         return Err(ChatError::tool_unknown(name));
//!     }
//!     Ok(())
//! }
//!
//! let err = lookup("delete_everything").unwrap_err();
//! assert_eq!(err.user_message(), "Error: Unknown tool delete_everything");
//! ```

use thiserror::Error;

/// Result type alias using `ChatError`.
pub type ChatResult<T> = Result<T, ChatError>;

/// Centralized error type for Shellchat.
#[derive(Debug, Error)]
pub enum ChatError {
    // ============== API Errors ==============
    /// Network error while talking to the model API.
    #[error("api: network error: {message}")]
    ApiNetwork {
        /// Description of the network error.
        message: String,
    },

    /// The model API rejected the request with 429.
    #[error("api: rate limited: {message}")]
    ApiRateLimited {
        /// Body returned by the API.
        message: String,
    },

    /// Missing, invalid or unauthorized API key.
    #[error("api: authentication failed: {message}")]
    ApiAuthentication {
        /// Description of the authentication error.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("api: request failed with status {status}: {body}")]
    ApiStatus {
        /// HTTP status code.
        status: u16,
        /// Body returned by the API.
        body: String,
    },

    /// The response could not be decoded or carried no answer.
    #[error("api: invalid response: {message}")]
    ApiInvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    // ============== Tool Errors ==============
    /// The model asked for a tool that is not registered.
    #[error("tools: unknown tool '{name}'")]
    ToolUnknown {
        /// The requested tool name.
        name: String,
    },

    /// The model called a tool with arguments the tool cannot use.
    #[error("tools: invalid input for '{tool}': {message}")]
    ToolInvalidInput {
        /// The tool name.
        tool: String,
        /// What was wrong with the input.
        message: String,
    },

    /// The model kept requesting tools past the configured cap.
    #[error("loop: tool call limit of {max_rounds} rounds exceeded")]
    ToolRoundsExceeded {
        /// The configured cap.
        max_rounds: usize,
    },

    // ============== Web Errors ==============
    /// The chat page server could not be started.
    #[error("web: {message}")]
    Web {
        /// Description of the server error.
        message: String,
    },
}

// ============== Constructor Methods ==============

impl ChatError {
    /// Creates a network error.
    #[must_use]
    pub fn api_network(message: impl Into<String>) -> Self {
        Self::ApiNetwork {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn api_rate_limited(message: impl Into<String>) -> Self {
        Self::ApiRateLimited {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn api_authentication(message: impl Into<String>) -> Self {
        Self::ApiAuthentication {
            message: message.into(),
        }
    }

    /// Creates an error for an unexpected HTTP status.
    #[must_use]
    pub fn api_status(status: u16, body: impl Into<String>) -> Self {
        Self::ApiStatus {
            status,
            body: body.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn api_invalid_response(message: impl Into<String>) -> Self {
        Self::ApiInvalidResponse {
            message: message.into(),
        }
    }

    /// Creates an unknown tool error.
    #[must_use]
    pub fn tool_unknown(name: impl Into<String>) -> Self {
        Self::ToolUnknown { name: name.into() }
    }

    /// Creates an invalid tool input error.
    #[must_use]
    pub fn tool_invalid_input(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolInvalidInput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a loop cap error.
    #[must_use]
    pub fn tool_rounds_exceeded(max_rounds: usize) -> Self {
        Self::ToolRoundsExceeded { max_rounds }
    }

    /// Creates a web server error.
    #[must_use]
    pub fn web(message: impl Into<String>) -> Self {
        Self::Web {
            message: message.into(),
        }
    }

    /// Maps an HTTP error status and body to the matching API error.
    #[must_use]
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::api_authentication(body),
            429 => Self::api_rate_limited(body),
            _ => Self::api_status(status, body),
        }
    }
}

// ============== Category Methods ==============

impl ChatError {
    /// Returns `true` if retrying the same request could succeed.
    ///
    /// Nothing in Shellchat retries; this only informs logging.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiNetwork { .. } | Self::ApiRateLimited { .. } => true,
            Self::ApiStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` for failures talking to the remote model.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ApiNetwork { .. }
                | Self::ApiRateLimited { .. }
                | Self::ApiAuthentication { .. }
                | Self::ApiStatus { .. }
                | Self::ApiInvalidResponse { .. }
        )
    }

    /// Returns the module name where this error originated.
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Self::ApiNetwork { .. }
            | Self::ApiRateLimited { .. }
            | Self::ApiAuthentication { .. }
            | Self::ApiStatus { .. }
            | Self::ApiInvalidResponse { .. } => "api",

            Self::ToolUnknown { .. } | Self::ToolInvalidInput { .. } => "tools",

            Self::ToolRoundsExceeded { .. } => "loop",

            Self::Web { .. } => "web",
        }
    }

    /// Renders the text shown in the chat when a turn ends with this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ToolUnknown { name } => format!("Error: Unknown tool {name}"),
            Self::ToolRoundsExceeded { max_rounds } => format!(
                "Error: stopped after {max_rounds} tool call rounds without a final answer"
            ),
            other => format!("Error communicating with the model API: {other}"),
        }
    }
}

// ============== Conversion Implementations ==============

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::api_invalid_response(err.to_string())
        } else {
            Self::api_network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::api_invalid_response(err.to_string())
    }
}
