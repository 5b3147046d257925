//! Configuration types for Shellchat.
//!
//! `main` builds a [`Config`] from command-line flags and environment
//! variables; everything downstream reads from it.

use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;

/// Default port for the chat page.
pub const DEFAULT_PORT: u16 = 7860;

/// Default cap on tool executions per chat turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 25;

/// Which remote model API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// Anthropic Messages.
    Anthropic,
}

impl Provider {
    /// Model used when none is given on the command line.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    /// Environment variable holding the API key for this provider.
    #[must_use]
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(format!(
                "unknown provider '{other}' (expected 'gemini' or 'anthropic')"
            )),
        }
    }
}

/// Reads the provider's API key from its environment variable.
///
/// Empty values count as unset.
#[must_use]
pub fn api_key_from_env(provider: Provider) -> Option<SecretString> {
    std::env::var(provider.api_key_env())
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

/// Application configuration.
///
/// # Security Note
///
/// The API key is a [`SecretString`] so it never shows up in `Debug` output
/// or logs. It is optional: without one the server still starts and every
/// model call fails with an authentication error shown in the chat.
///
/// # Examples
///
/// ```
/// use shellchat::types::config::{Config, Provider};
///
/// let config = Config::new(Provider::Gemini)
///     .with_port(8080)
///     .with_share(true);
///
/// assert_eq!(config.model(), "gemini-2.5-flash");
/// assert_eq!(config.listen_addr(), "0.0.0.0:8080");
/// ```
#[derive(Debug)]
pub struct Config {
    api_key: Option<SecretString>,
    provider: Provider,
    model: String,
    api_base_url: Option<String>,
    host: String,
    port: u16,
    share: bool,
    max_tool_rounds: Option<usize>,
    system_prompt: Option<String>,
}

impl Config {
    /// Creates a configuration with defaults for the given provider.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            api_key: None,
            provider,
            model: provider.default_model().to_string(),
            api_base_url: None,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            share: false,
            max_tool_rounds: Some(DEFAULT_MAX_TOOL_ROUNDS),
            system_prompt: None,
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL (proxies, tests).
    #[must_use]
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        self.api_base_url = url;
        self
    }

    /// Sets the interface the chat page listens on.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the chat page port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Listen on all interfaces instead of `host`.
    #[must_use]
    pub fn with_share(mut self, share: bool) -> Self {
        self.share = share;
        self
    }

    /// Sets the tool round cap. `None` means unbounded.
    #[must_use]
    pub fn with_max_tool_rounds(mut self, max: Option<usize>) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Sets a system prompt sent with every request.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Returns the API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// Returns the provider.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the API base URL override.
    #[must_use]
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Returns whether the page is shared beyond localhost.
    #[must_use]
    pub fn share(&self) -> bool {
        self.share
    }

    /// Returns the tool round cap.
    #[must_use]
    pub fn max_tool_rounds(&self) -> Option<usize> {
        self.max_tool_rounds
    }

    /// Returns the system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Returns the `host:port` the chat server binds to.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        let host = if self.share { "0.0.0.0" } else { &self.host };
        format!("{}:{}", host, self.port)
    }
}
