//! Shellchat - web chat with a model that can run shell commands

use anyhow::Result;
use clap::Parser;
use secrecy::SecretString;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shellchat::app;
use shellchat::types::config::{
    api_key_from_env, Config, Provider, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_PORT,
};

#[derive(Parser, Debug)]
#[command(name = "shellchat")]
#[command(about = "Web chat with a language model that can run shell commands on this machine")]
#[command(version)]
struct Args {
    /// Model API to use: gemini or anthropic
    #[arg(long, default_value = "gemini")]
    provider: Provider,

    /// Model to use (defaults to the provider's default model)
    #[arg(short, long)]
    model: Option<String>,

    /// API key (or set GEMINI_API_KEY / ANTHROPIC_API_KEY)
    #[arg(long)]
    api_key: Option<SecretString>,

    /// Base URL of the model API, for proxies and local mocks
    #[arg(long, value_name = "URL")]
    api_base_url: Option<String>,

    /// Address to bind the chat page to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the chat page to
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Listen on all interfaces so other machines can open the chat.
    /// Anyone who can reach the port can run commands on this host.
    #[arg(long)]
    share: bool,

    /// Maximum tool executions per message (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    max_tool_rounds: usize,

    /// System prompt sent with every request
    #[arg(long)]
    system_prompt: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let api_key = self.api_key.or_else(|| api_key_from_env(self.provider));
        let mut config = Config::new(self.provider)
            .with_api_key(api_key)
            .with_api_base_url(self.api_base_url)
            .with_host(self.host)
            .with_port(self.port)
            .with_share(self.share)
            .with_max_tool_rounds((self.max_tool_rounds > 0).then_some(self.max_tool_rounds))
            .with_system_prompt(self.system_prompt);
        if let Some(model) = self.model {
            config = config.with_model(model);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = args.into_config();
    if config.api_key().is_none() {
        warn!(
            env = config.provider().api_key_env(),
            "No API key configured; model calls will fail until one is provided"
        );
    }

    app::run(config).await
}
