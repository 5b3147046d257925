//! The model session.
//!
//! One [`ModelSession`] owns the one conversation this process has. It is
//! created empty, becomes live on the first [`ModelSession::start`] (or
//! implicitly on the first send) and is never reset.
//!
//! A turn can end while the model's last request still has tool calls
//! pending (unknown tool, round cap, bad arguments). Providers reject a history
//! with unanswered calls, so the next send answers them with error results
//! first.
//!
//! A failed send removes the text it added but keeps tool results: those
//! commands already ran, and the next send delivers their real output ahead of
//! the new message.

use tracing::{debug, info};

use crate::api::{ModelBackend, ModelReply, ToolDefinition};
use crate::error::ChatResult;
use crate::types::content::{extract_tool_uses, ContentBlock, ToolResultBlock, ToolUseBlock};
use crate::types::message::{Message, Role};

/// Result text for calls left pending when a turn ended.
pub const ABANDONED_CALL_MESSAGE: &str =
    "Not executed: the previous turn ended before this call ran.";

/// Ordered conversation history.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Returns the messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been exchanged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool calls in the last message, if the model sent it.
    fn pending_calls(&self) -> Vec<ToolUseBlock> {
        match self.messages.last() {
            Some(last) if last.role == Role::Assistant => extract_tool_uses(&last.content)
                .into_iter()
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Adds user content, merging into a trailing user message.
    ///
    /// Returns the index in that message where the new blocks start.
    fn append_user(&mut self, content: Vec<ContentBlock>) -> usize {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::User => {
                let start = last.content.len();
                last.content.extend(content);
                start
            }
            _ => {
                self.messages.push(Message::user(content));
                0
            }
        }
    }

    /// Undoes [`Conversation::append_user`] from `start`, keeping tool results.
    fn rollback_user(&mut self, start: usize) {
        let Some(last) = self.messages.last_mut() else {
            return;
        };
        if last.role != Role::User {
            return;
        }
        let added = last.content.split_off(start.min(last.content.len()));
        last.content.extend(
            added
                .into_iter()
                .filter(|block| block.as_tool_result().is_some()),
        );
        if last.content.is_empty() {
            self.messages.pop();
        }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// A conversation with one remote model, plus the tools it is offered.
pub struct ModelSession<B> {
    backend: B,
    tools: Vec<ToolDefinition>,
    system_prompt: Option<String>,
    conversation: Option<Conversation>,
}

impl<B: ModelBackend> ModelSession<B> {
    /// Creates a session that has not started yet.
    #[must_use]
    pub fn new(backend: B, tools: Vec<ToolDefinition>) -> Self {
        Self {
            backend,
            tools,
            system_prompt: None,
            conversation: None,
        }
    }

    /// Sets the system prompt sent with every request.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Creates the conversation if it does not exist yet.
    ///
    /// Calling this again keeps the existing history.
    pub fn start(&mut self) -> &mut Conversation {
        self.conversation.get_or_insert_with(|| {
            info!(tools = self.tools.len(), "Model session started");
            Conversation::default()
        })
    }

    /// Returns true once the conversation exists.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.conversation.is_some()
    }

    /// Messages exchanged so far. Empty before the session starts.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        self.conversation
            .as_ref()
            .map_or(&[], Conversation::messages)
    }

    /// Sends one user message and records the model's reply.
    ///
    /// # Errors
    ///
    /// Returns the backend's error. Text added by this send is dropped from
    /// the history; tool results stay and go out with the next send.
    pub async fn send(&mut self, content: Vec<ContentBlock>) -> ChatResult<ModelReply> {
        self.start();
        let Self {
            backend,
            tools,
            system_prompt,
            conversation,
        } = self;
        let conversation = conversation.get_or_insert_with(Conversation::default);

        let pending = conversation.pending_calls();
        let start = conversation.append_user(answer_pending(pending, content));
        debug!(messages = conversation.len(), "Sending to model");

        match backend
            .generate(system_prompt.as_deref(), conversation.messages(), tools)
            .await
        {
            Ok(reply) => {
                if !reply.is_empty() {
                    conversation.push(Message::assistant(reply.content.clone()));
                }
                Ok(reply)
            }
            Err(err) => {
                conversation.rollback_user(start);
                Err(err)
            }
        }
    }
}

/// Prefixes `content` with error results for pending calls it does not answer.
fn answer_pending(pending: Vec<ToolUseBlock>, content: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let answered: Vec<&str> = content
        .iter()
        .filter_map(ContentBlock::as_tool_result)
        .map(|result| result.tool_use_id.as_str())
        .collect();

    let mut blocks: Vec<ContentBlock> = pending
        .iter()
        .filter(|call| !answered.contains(&call.id.as_str()))
        .map(|call| ToolResultBlock::error(call, ABANDONED_CALL_MESSAGE).into())
        .collect();
    if !blocks.is_empty() {
        debug!(abandoned = blocks.len(), "Answering calls left by the previous turn");
    }
    blocks.extend(content);
    blocks
}
