//! Remote model API clients.
//!
//! Both providers implement [`ModelBackend`]: given the system prompt, the
//! conversation so far and the tool schemas, return the model's next reply as
//! provider-neutral [`ContentBlock`]s. Requests are plain request/response
//! (no streaming) and are never retried.

pub mod anthropic;
pub mod gemini;
pub mod tools;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ChatError, ChatResult};
use crate::types::config::{Config, Provider};
use crate::types::content::{extract_text, extract_tool_uses, ContentBlock, ToolUseBlock};
use crate::types::message::Message;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use tools::ToolDefinition;

/// One model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Content blocks in the order the model produced them.
    pub content: Vec<ContentBlock>,
}

impl ModelReply {
    /// Creates a reply from content blocks.
    #[must_use]
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self { content }
    }

    /// Concatenated text of the reply.
    #[must_use]
    pub fn text(&self) -> String {
        extract_text(&self.content)
    }

    /// All tool invocation requests, in response order.
    #[must_use]
    pub fn tool_uses(&self) -> Vec<&ToolUseBlock> {
        extract_tool_uses(&self.content)
    }

    /// The first tool invocation request, if any.
    #[must_use]
    pub fn first_tool_use(&self) -> Option<&ToolUseBlock> {
        self.content.iter().find_map(ContentBlock::as_tool_use)
    }

    /// Returns true if the reply contains no blocks at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A conversational model reachable over some API.
#[allow(async_fn_in_trait)]
pub trait ModelBackend {
    /// Sends the full conversation and returns the model's next reply.
    ///
    /// # Errors
    ///
    /// Returns an API error for transport failures, non-success statuses and
    /// undecodable responses.
    async fn generate(
        &self,
        system: Option<&str>,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> ChatResult<ModelReply>;
}

/// The configured provider client.
#[derive(Clone)]
pub enum ModelClient {
    /// Google Gemini.
    Gemini(GeminiClient),
    /// Anthropic Messages.
    Anthropic(AnthropicClient),
}

impl ModelClient {
    /// Builds the client selected by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let api_key = config.api_key().cloned();
        match (config.provider(), config.api_base_url()) {
            (Provider::Gemini, Some(base)) => {
                Self::Gemini(GeminiClient::new_with_base_url(api_key, config.model(), base))
            }
            (Provider::Gemini, None) => Self::Gemini(GeminiClient::new(api_key, config.model())),
            (Provider::Anthropic, Some(base)) => Self::Anthropic(
                AnthropicClient::new_with_base_url(api_key, config.model(), base),
            ),
            (Provider::Anthropic, None) => {
                Self::Anthropic(AnthropicClient::new(api_key, config.model()))
            }
        }
    }
}

impl ModelBackend for ModelClient {
    async fn generate(
        &self,
        system: Option<&str>,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> ChatResult<ModelReply> {
        match self {
            Self::Gemini(client) => client.generate(system, history, tools).await,
            Self::Anthropic(client) => client.generate(system, history, tools).await,
        }
    }
}

/// Returns the key, or the error every call fails with when none is configured.
pub(crate) fn require_key(key: Option<&SecretString>, provider: Provider) -> ChatResult<&str> {
    key.map(|k| k.expose_secret()).ok_or_else(|| {
        ChatError::api_authentication(format!(
            "no API key configured; set {} or pass --api-key",
            provider.api_key_env()
        ))
    })
}

/// Passes successful responses through and converts the rest to errors.
pub(crate) async fn error_for_status(response: reqwest::Response) -> ChatResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::from_status(status.as_u16(), body))
}
