//! The chat page and its JSON API.
//!
//! `tiny_http` is blocking, so the server runs on its own thread and hands
//! each chat request to the async side as a [`ChatRequest`] over a bounded
//! channel. The answer comes back on a oneshot. Requests are handled one at a
//! time.
//!
//! | Route               | Method | Body                     | Answer                    |
//! |---------------------|--------|--------------------------|---------------------------|
//! | `/`                 | GET    |                          | chat page                 |
//! | `/api/chat`         | POST   | `{"message": "..."}`     | `{"reply": "..."}`        |
//! | `/api/history`      | GET    |                          | `[ChatTurn, ...]`         |

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{ChatError, ChatResult};
use crate::types::message::ChatTurn;

const CHAT_PAGE: &str = include_str!("chat.html");

/// Pending requests the server thread may queue.
const CHANNEL_CAPACITY: usize = 8;

/// Work the server thread hands to the chat app.
#[derive(Debug)]
pub enum ChatRequest {
    /// Run one chat turn.
    Chat {
        /// The user's message.
        message: String,
        /// Receives the text to display.
        reply: oneshot::Sender<String>,
    },
    /// Read the transcript.
    History {
        /// Receives the turns so far.
        reply: oneshot::Sender<Vec<ChatTurn>>,
    },
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct ReplyBody<'a> {
    reply: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Page,
    Chat,
    History,
    MethodNotAllowed(&'static str),
    NotFound,
}

fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url);
    match (path, method) {
        ("/", Method::Get) => Route::Page,
        ("/api/chat", Method::Post) => Route::Chat,
        ("/api/history", Method::Get) => Route::History,
        ("/" | "/api/history", _) => Route::MethodNotAllowed("GET"),
        ("/api/chat", _) => Route::MethodNotAllowed("POST"),
        _ => Route::NotFound,
    }
}

/// The HTTP server for the chat page.
pub struct ChatServer {
    server: Arc<Server>,
}

impl ChatServer {
    /// Binds to `addr` (`host:port`; port 0 picks a free one).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Web`] if the address cannot be bound.
    pub fn bind(addr: &str) -> ChatResult<Self> {
        let server = Server::http(addr)
            .map_err(|e| ChatError::web(format!("failed to bind {addr}: {e}")))?;
        Ok(Self {
            server: Arc::new(server),
        })
    }

    /// The bound address, if it is an IP socket.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Starts serving on a new thread and returns the request stream.
    ///
    /// The thread lives as long as the process. Once the receiver is dropped,
    /// chat requests are answered with 503.
    #[must_use]
    pub fn spawn(self) -> mpsc::Receiver<ChatRequest> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let server = self.server;

        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                handle(request, &tx);
            }
        });

        rx
    }
}

fn handle(mut request: Request, tx: &mpsc::Sender<ChatRequest>) {
    let route = route(request.method(), request.url());
    debug!(method = %request.method(), url = %request.url(), ?route, "HTTP request");

    let (status, content_type, body) = match route {
        Route::Page => (200, "text/html; charset=utf-8", CHAT_PAGE.to_string()),
        Route::Chat => {
            let mut raw = String::new();
            match request.as_reader().read_to_string(&mut raw) {
                Ok(_) => chat(&raw, tx),
                Err(e) => error_json(400, &format!("unreadable body: {e}")),
            }
        }
        Route::History => history(tx),
        Route::MethodNotAllowed(allow) => {
            let (status, content_type, body) = error_json(405, "method not allowed");
            let response = with_header(json_response(status, content_type, body), "Allow", allow);
            respond(request, response);
            return;
        }
        Route::NotFound => error_json(404, "not found"),
    };

    respond(request, json_response(status, content_type, body));
}

fn chat(raw: &str, tx: &mpsc::Sender<ChatRequest>) -> (u16, &'static str, String) {
    let message = match serde_json::from_str::<ChatBody>(raw) {
        Ok(body) => body.message,
        Err(e) => return error_json(400, &format!("invalid JSON body: {e}")),
    };
    if message.trim().is_empty() {
        return error_json(400, "message must not be empty");
    }

    let (reply, rx) = oneshot::channel();
    if tx.blocking_send(ChatRequest::Chat { message, reply }).is_err() {
        return error_json(503, "chat is not running");
    }
    match rx.blocking_recv() {
        Ok(text) => to_json(200, &ReplyBody { reply: &text }),
        Err(_) => error_json(503, "chat is not running"),
    }
}

fn history(tx: &mpsc::Sender<ChatRequest>) -> (u16, &'static str, String) {
    let (reply, rx) = oneshot::channel();
    if tx.blocking_send(ChatRequest::History { reply }).is_err() {
        return error_json(503, "chat is not running");
    }
    match rx.blocking_recv() {
        Ok(turns) => to_json(200, &turns),
        Err(_) => error_json(503, "chat is not running"),
    }
}

fn to_json<T: Serialize>(status: u16, value: &T) -> (u16, &'static str, String) {
    match serde_json::to_string(value) {
        Ok(body) => (status, "application/json", body),
        Err(e) => error_json(500, &e.to_string()),
    }
}

fn error_json(status: u16, message: &str) -> (u16, &'static str, String) {
    let body = serde_json::to_string(&ErrorBody { error: message })
        .unwrap_or_else(|_| String::from("{}"));
    (status, "application/json", body)
}

fn json_response(
    status: u16,
    content_type: &str,
    body: String,
) -> Response<std::io::Cursor<Vec<u8>>> {
    with_header(
        Response::from_string(body).with_status_code(status),
        "Content-Type",
        content_type,
    )
}

fn with_header(
    response: Response<std::io::Cursor<Vec<u8>>>,
    name: &str,
    value: &str,
) -> Response<std::io::Cursor<Vec<u8>>> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn respond(request: Request, response: Response<std::io::Cursor<Vec<u8>>>) {
    if let Err(e) = request.respond(response) {
        warn!(error = %e, "Failed to write HTTP response");
    }
}
