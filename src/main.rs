//! Droid bot - chat relay to a hosted language model
//!
//! Answers `!droid` messages with Gemini completions, keeping a short
//! rolling history per channel.

mod bot;
mod config;
mod gateway;
mod history;
mod llm;

use bot::Bot;
use config::BotConfig;
use gateway::console::{self, ConsoleSink};
use gateway::Dispatcher;
use llm::{CompletionClient, CompletionService, LoggingService, ReqwestTransport};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "droid_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; completion requests will be refused");
    }

    // Completion service
    let transport = ReqwestTransport::new(config.http_timeout)?;
    let client: Arc<dyn CompletionService> = Arc::new(CompletionClient::new(transport, &config));
    let completions = Arc::new(LoggingService::new(client));

    let bot = Arc::new(Bot::new(&config, completions));
    tracing::info!(
        trigger = %bot.trigger(),
        model = %config.model,
        max_history_turns = config.max_history_turns,
        max_attempts = config.max_attempts,
        serialize_channels = config.serialize_channels,
        "Droid bot ready"
    );

    let dispatcher = Dispatcher::new(bot, Arc::new(ConsoleSink::new()));
    console::run(&dispatcher).await?;

    Ok(())
}
