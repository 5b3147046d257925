//! Application core

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub mod tool_loop;
use tool_loop::ToolLoop;

use crate::api::{ModelBackend, ModelClient};
use crate::session::ModelSession;
use crate::tools::{HostShell, ShellTool, ToolRegistry};
use crate::types::message::ChatTurn;
use crate::web::{ChatRequest, ChatServer};

pub use crate::types::Config;

/// The chat contract: user text in, assistant text out.
///
/// Owns the only model session of the process, the tools offered to it and
/// the transcript shown on the chat page.
pub struct ChatApp<B> {
    session: ModelSession<B>,
    registry: ToolRegistry,
    max_rounds: Option<usize>,
    transcript: Vec<ChatTurn>,
}

impl<B: ModelBackend> ChatApp<B> {
    /// Creates an app with no tool-round limit.
    #[must_use]
    pub fn new(session: ModelSession<B>, registry: ToolRegistry) -> Self {
        Self {
            session,
            registry,
            max_rounds: None,
            transcript: Vec::new(),
        }
    }

    /// Limits tool executions per turn. `None` is unbounded.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Runs one chat turn and returns the text to display.
    ///
    /// Failures are rendered into the returned text.
    pub async fn submit(&mut self, message: &str) -> String {
        let reply = ToolLoop::new(&mut self.session, &self.registry, self.max_rounds)
            .run(message)
            .await;
        self.transcript.push(ChatTurn::new(message, reply.clone()));
        reply
    }

    /// Every exchange so far, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// The underlying model session.
    #[must_use]
    pub fn session(&self) -> &ModelSession<B> {
        &self.session
    }
}

/// Answers chat requests until the sender side goes away.
pub async fn serve<B: ModelBackend>(app: &mut ChatApp<B>, mut requests: mpsc::Receiver<ChatRequest>) {
    while let Some(request) = requests.recv().await {
        match request {
            ChatRequest::Chat { message, reply } => {
                let text = app.submit(&message).await;
                if reply.send(text).is_err() {
                    debug!("Chat client went away before the reply");
                }
            }
            ChatRequest::History { reply } => {
                let _ = reply.send(app.transcript().to_vec());
            }
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    let client = ModelClient::from_config(&config);
    let registry = ToolRegistry::new().with(ShellTool::new(HostShell::new()));
    let mut session = ModelSession::new(client, registry.definitions())
        .with_system_prompt(config.system_prompt().map(str::to_string));
    session.start();

    let mut app = ChatApp::new(session, registry).with_max_rounds(config.max_tool_rounds());

    let server = ChatServer::bind(&config.listen_addr())?;
    let url = match server.local_addr() {
        Some(addr) => format!("http://{addr}/"),
        None => format!("http://{}/", config.listen_addr()),
    };
    info!(
        provider = %config.provider(),
        model = config.model(),
        share = config.share(),
        %url,
        "Chat server listening"
    );
    println!("Shellchat running on {url}");
    if config.share() {
        println!("Listening on all interfaces. Anyone who can reach this port can run commands.");
    }

    let requests = server.spawn();
    tokio::select! {
        () = serve(&mut app, requests) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
