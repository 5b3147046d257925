//! Unit tests for core types.

use serde_json::json;
use shellchat::api::ModelReply;
use shellchat::types::config::{Config, Provider};
use shellchat::types::{ChatTurn, ContentBlock, Message, Role, ToolResultBlock, ToolUseBlock};

#[test]
fn test_provider_parsing_accepts_aliases() {
    assert_eq!("gemini".parse::<Provider>(), Ok(Provider::Gemini));
    assert_eq!("Google".parse::<Provider>(), Ok(Provider::Gemini));
    assert_eq!("anthropic".parse::<Provider>(), Ok(Provider::Anthropic));
    assert_eq!("claude".parse::<Provider>(), Ok(Provider::Anthropic));
    assert!("openai".parse::<Provider>().is_err());
}

#[test]
fn test_provider_display_round_trips() {
    for provider in [Provider::Gemini, Provider::Anthropic] {
        assert_eq!(provider.to_string().parse::<Provider>(), Ok(provider));
    }
}

#[test]
fn test_config_defaults_follow_provider() {
    let config = Config::new(Provider::Anthropic);
    assert_eq!(config.model(), "claude-sonnet-4-20250514");
    assert_eq!(config.listen_addr(), "127.0.0.1:7860");
    assert!(config.api_key().is_none());
    assert!(!config.share());
}

#[test]
fn test_content_block_json_tags() {
    let call = ToolUseBlock::new("c1", "execute_shell_command", json!({"command": "ls"}));
    assert_eq!(
        serde_json::to_value(ContentBlock::ToolUse(call.clone())).unwrap(),
        json!({"type": "tool_use", "id": "c1", "name": "execute_shell_command", "input": {"command": "ls"}})
    );

    let result: ContentBlock = ToolResultBlock::success(&call, "a.txt").into();
    assert_eq!(
        serde_json::to_value(result).unwrap()["type"],
        "tool_result"
    );
}

#[test]
fn test_message_text_ignores_tool_blocks() {
    let msg = Message::assistant(vec![
        ContentBlock::text("Running "),
        ContentBlock::tool_use("1", "execute_shell_command", json!({"command": "ls"})),
        ContentBlock::text("ls."),
    ]);
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.text(), "Running ls.");
}

#[test]
fn test_model_reply_without_calls() {
    let reply = ModelReply::new(vec![ContentBlock::text("Hi, how can I help?")]);
    assert!(reply.first_tool_use().is_none());
    assert!(reply.tool_uses().is_empty());
    assert!(!reply.is_empty());
}

#[test]
fn test_chat_turn_deserializes() {
    let turn: ChatTurn =
        serde_json::from_value(json!({"user_message": "hello", "assistant_reply": "hi"})).unwrap();
    assert_eq!(turn, ChatTurn::new("hello", "hi"));
}
