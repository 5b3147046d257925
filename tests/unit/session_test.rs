//! Unit tests for the model session.

use pretty_assertions::assert_eq;
use shellchat::api::tools::shell_tool;
use shellchat::error::ChatError;
use shellchat::session::ModelSession;
use shellchat::types::{ContentBlock, Role};

use crate::common::{text_reply, ScriptedBackend};

#[test]
fn test_new_session_is_not_started() {
    let session = ModelSession::new(ScriptedBackend::default(), vec![]);
    assert!(!session.is_started());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_start_twice_keeps_history() {
    let backend = ScriptedBackend::new(vec![text_reply("hi")]);
    let mut session = ModelSession::new(backend, vec![]);

    session.start();
    session
        .send(vec![ContentBlock::text("hello")])
        .await
        .expect("send");
    session.start();

    assert!(session.is_started());
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_send_starts_lazily() {
    let backend = ScriptedBackend::new(vec![text_reply("hi")]);
    let mut session = ModelSession::new(backend, vec![]);

    session
        .send(vec![ContentBlock::text("hello")])
        .await
        .expect("send");

    assert!(session.is_started());
}

#[tokio::test]
async fn test_every_request_carries_full_history_and_tools() {
    let backend = ScriptedBackend::new(vec![text_reply("one"), text_reply("two")]);
    let mut session = ModelSession::new(backend.clone(), vec![shell_tool()]);

    session.send(vec![ContentBlock::text("a")]).await.expect("send");
    session.send(vec![ContentBlock::text("b")]).await.expect("send");

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(requests[1].len(), 3);
    assert_eq!(requests[1][1].role, Role::Assistant);
    assert_eq!(requests[1][1].text(), "one");
    assert_eq!(backend.tools_seen(), vec!["execute_shell_command"]);
}

#[tokio::test]
async fn test_error_keeps_earlier_exchanges() {
    let backend = ScriptedBackend::new(vec![
        text_reply("one"),
        Err(ChatError::api_rate_limited("quota")),
        text_reply("three"),
    ]);
    let mut session = ModelSession::new(backend.clone(), vec![]);

    session.send(vec![ContentBlock::text("a")]).await.expect("send");
    let err = session
        .send(vec![ContentBlock::text("b")])
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::ApiRateLimited { .. }));
    assert_eq!(session.history().len(), 2);

    session.send(vec![ContentBlock::text("c")]).await.expect("send");
    let texts: Vec<String> = session.history().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["a", "one", "c", "three"]);
}
