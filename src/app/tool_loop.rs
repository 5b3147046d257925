//! The tool-call loop.
//!
//! One chat turn: send the user's message, and while the model answers with a
//! tool request, run it and send the result back. The turn ends on the first
//! reply without a tool request.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐  reply has tool request, tool known
//! │ AwaitingModel │ ─────────────────────────────────┐
//! └───────┬───────┘ ◄───── run it, send result ──────┘
//!         │ plain reply / unknown tool / error / cap
//!         ▼
//!     ┌──────┐
//!     │ Done │
//!     └──────┘
//! ```
//!
//! Only the first tool request of a reply is executed. Any others in the same
//! reply get an error result so the provider still sees every call answered.

use tracing::{debug, info, warn};

use crate::api::ModelBackend;
use crate::error::{ChatError, ChatResult};
use crate::session::ModelSession;
use crate::tools::ToolRegistry;
use crate::types::content::{ContentBlock, ToolResultBlock};

/// Result text sent for tool requests beyond the first in one reply.
pub const SKIPPED_CALL_MESSAGE: &str =
    "Not executed: only one tool call is handled per response. Request it again if still needed.";

/// State of the tool-call loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    /// A request is outstanding, or about to be sent.
    #[default]
    AwaitingModel,
    /// The turn is over.
    Done,
}

/// Drives a single chat turn to completion.
pub struct ToolLoop<'a, B> {
    session: &'a mut ModelSession<B>,
    registry: &'a ToolRegistry,
    max_rounds: Option<usize>,
    state: LoopState,
    rounds: usize,
}

impl<'a, B: ModelBackend> ToolLoop<'a, B> {
    /// Creates a loop over a session and the tools it may call.
    ///
    /// `max_rounds` bounds tool executions per turn; `None` is unbounded.
    #[must_use]
    pub fn new(
        session: &'a mut ModelSession<B>,
        registry: &'a ToolRegistry,
        max_rounds: Option<usize>,
    ) -> Self {
        Self {
            session,
            registry,
            max_rounds,
            state: LoopState::AwaitingModel,
            rounds: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Tool executions so far in this turn.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Runs the turn and returns the text to display. Never fails.
    pub async fn run(&mut self, message: &str) -> String {
        let outcome = self.drive(message).await;
        self.state = LoopState::Done;

        match outcome {
            Ok(text) => {
                info!(rounds = self.rounds, "Turn complete");
                text
            }
            Err(err) => {
                warn!(
                    module = err.module(),
                    retryable = err.is_retryable(),
                    rounds = self.rounds,
                    error = %err,
                    "Turn failed"
                );
                err.user_message()
            }
        }
    }

    async fn drive(&mut self, message: &str) -> ChatResult<String> {
        let registry = self.registry;
        let mut reply = self.session.send(vec![ContentBlock::text(message)]).await?;

        loop {
            let results = {
                let calls = reply.tool_uses();
                let Some((first, rest)) = calls.split_first() else {
                    return Ok(reply.text());
                };

                let Some(handler) = registry.get(&first.name) else {
                    return Err(ChatError::tool_unknown(first.name.as_str()));
                };

                if self.max_rounds.is_some_and(|max| self.rounds >= max) {
                    return Err(ChatError::tool_rounds_exceeded(self.rounds));
                }

                if !rest.is_empty() {
                    debug!(skipped = rest.len(), "Ignoring extra tool requests");
                }

                self.rounds += 1;
                debug!(tool = %first.name, round = self.rounds, "Executing tool");
                let output = handler.call(first).await?;

                let mut results = vec![ContentBlock::from(ToolResultBlock::success(first, output))];
                results.extend(rest.iter().map(|call| {
                    ContentBlock::from(ToolResultBlock::error(call, SKIPPED_CALL_MESSAGE))
                }));
                results
            };

            reply = self.session.send(results).await?;
        }
    }
}
