//! Google Gemini API client.
//!
//! Talks to `models/{model}:generateContent`. Tool calls arrive as
//! `functionCall` parts and results go back as `functionResponse` parts with
//! the payload `{"result": text}`. Gemini matches responses to calls by
//! name, so the call ids Shellchat tracks never leave the process.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::{error_for_status, require_key, ModelBackend, ModelReply, ToolDefinition};
use crate::error::{ChatError, ChatResult};
use crate::types::config::Provider;
use crate::types::content::{ContentBlock, ToolUseBlock};
use crate::types::message::{Message, Role};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the production endpoint.
    ///
    /// A leading `models/` in the model name is accepted and dropped.
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
            model: model.trim_start_matches("models/").to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl ModelBackend for GeminiClient {
    async fn generate(
        &self,
        system: Option<&str>,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> ChatResult<ModelReply> {
        let key = require_key(self.api_key.as_ref(), Provider::Gemini)?;
        let request = build_request(system, history, tools);

        debug!(model = %self.model, messages = history.len(), "Gemini API request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await?;

        let body: GenerateResponse = error_for_status(response).await?.json().await?;
        parse_response(body)
    }
}

// ============== Wire Format ==============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool<'a>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    /// Thought summaries are not part of the answer.
    #[serde(default, skip_serializing)]
    thought: bool,
    /// Echoed back unchanged on function-call parts; newer models reject
    /// histories without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    #[serde(default, skip_serializing)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool<'a> {
    function_declarations: Vec<FunctionDeclaration<'a>>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn build_request<'a>(
    system: Option<&str>,
    history: &[Message],
    tools: &'a [ToolDefinition],
) -> GenerateRequest<'a> {
    let tools = if tools.is_empty() {
        Vec::new()
    } else {
        vec![Tool {
            function_declarations: tools
                .iter()
                .map(|tool| FunctionDeclaration {
                    name: &tool.name,
                    description: &tool.description,
                    parameters: &tool.input_schema,
                })
                .collect(),
        }]
    };

    GenerateRequest {
        contents: history.iter().map(to_content).collect(),
        system_instruction: system.map(|text| Content {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
                ..Part::default()
            }],
        }),
        tools,
    }
}

fn to_content(message: &Message) -> Content {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };
    Content {
        role: Some(role.to_string()),
        parts: message.content.iter().map(to_part).collect(),
    }
}

fn to_part(block: &ContentBlock) -> Part {
    match block {
        ContentBlock::Text { text } => Part {
            text: Some(text.clone()),
            ..Part::default()
        },
        ContentBlock::ToolUse(call) => Part {
            function_call: Some(FunctionCall {
                id: None,
                name: call.name.clone(),
                args: call.input.clone(),
            }),
            thought_signature: call.signature.clone(),
            ..Part::default()
        },
        ContentBlock::ToolResult(result) => {
            let key = if result.is_error { "error" } else { "result" };
            let mut payload = Map::new();
            payload.insert(key.to_string(), Value::String(result.content.clone()));
            Part {
                function_response: Some(FunctionResponse {
                    name: result.name.clone(),
                    response: Value::Object(payload),
                }),
                ..Part::default()
            }
        }
    }
}

fn parse_response(response: GenerateResponse) -> ChatResult<ModelReply> {
    let GenerateResponse {
        candidates,
        prompt_feedback,
    } = response;

    let Some(Candidate {
        content,
        finish_reason,
    }) = candidates.into_iter().next()
    else {
        let message = match prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => format!("prompt blocked: {reason}"),
            None => "response contained no candidates".to_string(),
        };
        return Err(ChatError::api_invalid_response(message));
    };

    let mut blocks = Vec::new();
    for part in content.parts {
        if part.thought {
            continue;
        }
        if let Some(text) = part.text.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::text(text));
        }
        if let Some(call) = part.function_call {
            let id = call.id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let input = if call.args.is_null() {
                Value::Object(Map::new())
            } else {
                call.args
            };
            let call = ToolUseBlock::new(id, call.name, input)
                .with_signature(part.thought_signature);
            blocks.push(ContentBlock::ToolUse(call));
        }
    }

    if blocks.is_empty() {
        debug!(finish_reason = ?finish_reason, "Gemini returned an empty candidate");
    }

    Ok(ModelReply::new(blocks))
}
