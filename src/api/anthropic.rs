//! Anthropic Messages API client.
//!
//! Non-streaming `POST /v1/messages`. Tool calls arrive as `tool_use` blocks
//! and every one of them must be answered by a `tool_result` block carrying
//! the same id in the next user message.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{error_for_status, require_key, ModelBackend, ModelReply, ToolDefinition};
use crate::error::ChatResult;
use crate::types::config::Provider;
use crate::types::content::ContentBlock;
use crate::types::message::{Message, Role};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const MAX_TOKENS: u32 = 8192;

/// Anthropic API client.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a client for the production endpoint.
    #[must_use]
    pub fn new(api_key: Option<SecretString>, model: &str) -> Self {
        Self::new_with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom endpoint (proxies, mock servers).
    #[must_use]
    pub fn new_with_base_url(api_key: Option<SecretString>, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ModelBackend for AnthropicClient {
    async fn generate(
        &self,
        system: Option<&str>,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> ChatResult<ModelReply> {
        let key = require_key(self.api_key.as_ref(), Provider::Anthropic)?;

        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: history.iter().map(to_api_message).collect(),
            tools: tools
                .iter()
                .map(|tool| ApiTool {
                    name: &tool.name,
                    description: &tool.description,
                    input_schema: &tool.input_schema,
                })
                .collect(),
        };

        debug!(model = %self.model, messages = history.len(), "Anthropic API request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let body: ApiResponse = error_for_status(response).await?.json().await?;
        debug!(stop_reason = ?body.stop_reason, "Anthropic API response");

        Ok(ModelReply::new(
            body.content
                .into_iter()
                .filter_map(ResponseBlock::into_content)
                .collect(),
        ))
    }
}

// ============== Wire Format ==============

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Serialize)]
struct ApiTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: &'a Value,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
        is_error: bool,
    },
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

impl ResponseBlock {
    fn into_content(self) -> Option<ContentBlock> {
        match self {
            Self::Text { text } => Some(ContentBlock::text(text)),
            Self::ToolUse { id, name, input } => Some(ContentBlock::tool_use(id, name, input)),
            Self::Other => None,
        }
    }
}

fn to_api_message(message: &Message) -> ApiMessage<'_> {
    ApiMessage {
        role: match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => RequestBlock::Text {
                    text: text.as_str(),
                },
                ContentBlock::ToolUse(call) => RequestBlock::ToolUse {
                    id: &call.id,
                    name: &call.name,
                    input: &call.input,
                },
                ContentBlock::ToolResult(result) => RequestBlock::ToolResult {
                    tool_use_id: &result.tool_use_id,
                    content: &result.content,
                    is_error: result.is_error,
                },
            })
            .collect(),
    }
}
