//! Unit tests for the tool-call loop and the chat app around it.

use pretty_assertions::assert_eq;
use shellchat::api::ModelReply;
use shellchat::app::tool_loop::{LoopState, ToolLoop, SKIPPED_CALL_MESSAGE};
use shellchat::app::ChatApp;
use shellchat::error::ChatError;
use shellchat::session::ModelSession;
use shellchat::tools::ToolRegistry;
use shellchat::types::{ChatTurn, ContentBlock, Role};

use crate::common::{
    shell_call, shell_reply, text_reply, tool_reply, RecordingRunner, ScriptedBackend,
};

fn app(
    replies: Vec<shellchat::ChatResult<ModelReply>>,
    runner: &RecordingRunner,
) -> (ChatApp<ScriptedBackend>, ScriptedBackend) {
    let backend = ScriptedBackend::new(replies);
    let registry = ToolRegistry::shell(runner.clone());
    let session = ModelSession::new(backend.clone(), registry.definitions());
    (ChatApp::new(session, registry), backend)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_list_files_scenario() {
    let runner = RecordingRunner::new("a.txt\nb.txt");
    let (mut app, backend) = app(
        vec![
            shell_reply("call_1", "ls /tmp"),
            text_reply("The files are a.txt and b.txt."),
        ],
        &runner,
    );

    let reply = app.submit("list files in /tmp").await;

    assert_eq!(reply, "The files are a.txt and b.txt.");
    assert_eq!(runner.commands(), vec!["ls /tmp"]);
    assert_eq!(backend.calls(), 2);

    let second = &backend.requests()[1];
    let result = second
        .last()
        .and_then(|m| m.content.first())
        .and_then(ContentBlock::as_tool_result)
        .expect("tool result sent back");
    assert_eq!(result.tool_use_id, "call_1");
    assert_eq!(result.content, "a.txt\nb.txt");
    assert!(!result.is_error);
}

#[tokio::test]
async fn test_plain_greeting_never_runs_commands() {
    let runner = RecordingRunner::new("unused");
    let (mut app, backend) = app(vec![text_reply("Hi, how can I help?")], &runner);

    let reply = app.submit("hello").await;

    assert_eq!(reply, "Hi, how can I help?");
    assert!(runner.commands().is_empty());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_unknown_tool_ends_turn_without_execution() {
    let runner = RecordingRunner::new("unused");
    let (mut app, backend) = app(vec![tool_reply("c1", "read_file")], &runner);

    let reply = app.submit("show me the config").await;

    assert_eq!(reply, "Error: Unknown tool read_file");
    assert!(runner.commands().is_empty());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_two_rounds_then_answer() {
    let runner = RecordingRunner::new("ok");
    let (mut app, _backend) = app(
        vec![
            shell_reply("1", "mkdir /tmp/x"),
            shell_reply("2", "ls /tmp/x"),
            text_reply("Created it; it is empty."),
        ],
        &runner,
    );

    let reply = app.submit("make a dir and check it").await;

    assert_eq!(reply, "Created it; it is empty.");
    assert_eq!(runner.commands(), vec!["mkdir /tmp/x", "ls /tmp/x"]);
}

#[tokio::test]
async fn test_turn_after_unknown_tool_answers_the_stale_call() {
    let runner = RecordingRunner::new("unused");
    let (mut app, backend) = app(
        vec![tool_reply("c1", "read_file"), text_reply("Sorry about that.")],
        &runner,
    );

    app.submit("show me the config").await;
    let reply = app.submit("never mind").await;

    assert_eq!(reply, "Sorry about that.");
    let sent = backend.requests()[1].last().cloned().expect("user message");
    let stale = sent.content[0].as_tool_result().expect("stale call answered");
    assert_eq!(stale.tool_use_id, "c1");
    assert!(stale.is_error);
    assert_eq!(sent.text(), "never mind");
}

// ============================================================================
// Multiple requests, caps and errors
// ============================================================================

#[tokio::test]
async fn test_only_first_of_simultaneous_requests_runs() {
    let runner = RecordingRunner::new("ok");
    let (mut app, backend) = app(
        vec![
            Ok(ModelReply::new(vec![
                shell_call("a", "whoami"),
                shell_call("b", "rm -rf /tmp/x"),
            ])),
            text_reply("You are root."),
        ],
        &runner,
    );

    let reply = app.submit("who am i, then clean up").await;

    assert_eq!(reply, "You are root.");
    assert_eq!(runner.commands(), vec!["whoami"]);

    let answer = backend.requests()[1].last().cloned().expect("tool results");
    assert_eq!(answer.role, Role::User);
    let results: Vec<_> = answer
        .content
        .iter()
        .filter_map(ContentBlock::as_tool_result)
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_use_id, "a");
    assert!(!results[0].is_error);
    assert_eq!(results[1].tool_use_id, "b");
    assert!(results[1].is_error);
    assert_eq!(results[1].content, SKIPPED_CALL_MESSAGE);
}

#[tokio::test]
async fn test_cap_stops_runaway_model() {
    let runner = RecordingRunner::new("ok");
    let replies = (0..10)
        .map(|i| shell_reply(&i.to_string(), "sleep 0"))
        .collect();
    let (app, _backend) = app(replies, &runner);
    let mut app = app.with_max_rounds(Some(3));

    let reply = app.submit("loop").await;

    assert_eq!(
        reply,
        "Error: stopped after 3 tool call rounds without a final answer"
    );
    assert_eq!(runner.commands().len(), 3);
}

#[tokio::test]
async fn test_zero_cap_blocks_every_execution() {
    let runner = RecordingRunner::new("ok");
    let (app, _backend) = app(vec![shell_reply("1", "ls")], &runner);
    let mut app = app.with_max_rounds(Some(0));

    let reply = app.submit("ls").await;

    assert!(reply.starts_with("Error: stopped after 0 tool call rounds"));
    assert!(runner.commands().is_empty());
}

#[tokio::test]
async fn test_transport_error_becomes_chat_text() {
    let runner = RecordingRunner::new("ok");
    let (mut app, _backend) = app(
        vec![Err(ChatError::api_network("connection refused"))],
        &runner,
    );

    let reply = app.submit("hello").await;

    assert_eq!(
        reply,
        "Error communicating with the model API: api: network error: connection refused"
    );
    assert!(app.session().history().is_empty());
}

#[tokio::test]
async fn test_error_after_tool_round_keeps_completed_round() {
    let runner = RecordingRunner::new("a.txt");
    let (mut app, _backend) = app(
        vec![
            shell_reply("1", "ls"),
            Err(ChatError::api_status(500, "internal")),
        ],
        &runner,
    );

    let reply = app.submit("ls").await;

    assert!(reply.starts_with("Error communicating with the model API:"));
    assert_eq!(runner.commands(), vec!["ls"]);
    // user text, tool call, and the result of the command that ran
    assert_eq!(app.session().history().len(), 3);
}

#[tokio::test]
async fn test_next_turn_delivers_output_of_command_that_ran() {
    let runner = RecordingRunner::new("created");
    let (mut app, backend) = app(
        vec![
            shell_reply("1", "mkdir /tmp/shellchat-x"),
            Err(ChatError::api_network("connection reset")),
            text_reply("The directory exists now."),
        ],
        &runner,
    );

    app.submit("make the dir").await;
    let reply = app.submit("did that work?").await;

    assert_eq!(reply, "The directory exists now.");
    assert_eq!(runner.commands(), vec!["mkdir /tmp/shellchat-x"]);

    let sent = backend.requests()[2].last().cloned().expect("user message");
    let result = sent.content[0].as_tool_result().expect("real result resent");
    assert_eq!(result.tool_use_id, "1");
    assert_eq!(result.content, "created");
    assert!(!result.is_error);
    assert_eq!(sent.text(), "did that work?");
}

#[tokio::test]
async fn test_missing_command_argument_is_reported() {
    let runner = RecordingRunner::new("unused");
    let (mut app, _backend) = app(vec![tool_reply("1", "execute_shell_command")], &runner);

    let reply = app.submit("run something").await;

    assert!(reply.starts_with("Error communicating with the model API: tools: invalid input"));
    assert!(runner.commands().is_empty());
}

// ============================================================================
// Loop state and transcript
// ============================================================================

#[tokio::test]
async fn test_loop_reports_state_and_rounds() {
    let runner = RecordingRunner::new("ok");
    let backend = ScriptedBackend::new(vec![shell_reply("1", "ls"), text_reply("done")]);
    let registry = ToolRegistry::shell(runner);
    let mut session = ModelSession::new(backend, registry.definitions());

    let mut tool_loop = ToolLoop::new(&mut session, &registry, None);
    assert_eq!(tool_loop.state(), LoopState::AwaitingModel);

    let text = tool_loop.run("ls").await;

    assert_eq!(text, "done");
    assert_eq!(tool_loop.state(), LoopState::Done);
    assert_eq!(tool_loop.rounds(), 1);
}

#[tokio::test]
async fn test_transcript_records_each_turn() {
    let runner = RecordingRunner::new("ok");
    let (mut app, _backend) = app(
        vec![
            text_reply("Hi, how can I help?"),
            Err(ChatError::api_authentication("no key")),
        ],
        &runner,
    );

    app.submit("hello").await;
    let failed = app.submit("again").await;

    assert_eq!(
        app.transcript(),
        &[
            ChatTurn::new("hello", "Hi, how can I help?"),
            ChatTurn::new("again", failed),
        ]
    );
}
