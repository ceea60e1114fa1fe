mod bot;
mod config;

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use bot::{
    AdvisorClient, ConversationEngine, InMemorySessionStore, QueryLog, QuestionnaireCollector,
    TelegramClient,
};
use bot::transport::{run_polling, run_webhook};
use config::Config;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bizadvisor: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("bizadvisor.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting bizadvisor...");

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            me.username().to_string()
        }
        Err(e) => {
            warn!("Failed to get bot info: {e}");
            String::new()
        }
    };

    let sessions = Arc::new(InMemorySessionStore::new());
    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    let analyzer = Arc::new(AdvisorClient::new(config.anthropic_api_key.clone()));
    let query_log = Arc::new(QueryLog::in_dir(&config.data_dir));

    let engine = Arc::new(ConversationEngine::new(
        sessions,
        telegram,
        analyzer,
        query_log,
        Box::new(|| Box::new(QuestionnaireCollector::new())),
        bot_username,
    ));

    match config.webhook_url {
        Some(ref base_url) => {
            if let Err(e) = run_webhook(bot, engine, base_url, config.port).await {
                eprintln!("bizadvisor: webhook server failed: {e}");
                std::process::exit(1);
            }
        }
        None => run_polling(bot, engine).await,
    }
}
