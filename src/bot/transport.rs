//! Inbound transport: webhook (push) and long-poll (pull) delivery.
//!
//! Both modes normalize platform updates into [`InboundMessage`] and feed
//! them to the engine. Updates enqueued before process start are discarded
//! in both modes (no replay on restart).

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::UpdateKind;
use teloxide::update_listeners::Polling;
use tracing::{info, warn};

use crate::bot::engine::ConversationEngine;
use crate::bot::message::InboundMessage;

/// Normalize a Telegram message into the engine's inbound shape.
/// Non-text messages and messages without a sender are dropped.
pub fn inbound_from_message(msg: &Message) -> Option<InboundMessage> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;
    Some(InboundMessage {
        chat_id: msg.chat.id.0,
        user_id: user.id.0 as i64,
        text: text.to_string(),
    })
}

/// Parse one webhook body into an inbound message. Malformed bodies and
/// update kinds we don't handle yield `None`; the caller still acknowledges
/// the update so the platform does not redeliver it.
pub fn parse_update(body: &str) -> Option<InboundMessage> {
    let update: Update = match serde_json::from_str(body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Discarding malformed update: {e}");
            return None;
        }
    };

    match &update.kind {
        UpdateKind::Message(msg) => inbound_from_message(msg),
        _ => None,
    }
}

/// Pull mode: long-poll the platform for update batches, dropping anything
/// queued before startup.
pub async fn run_polling(bot: Bot, engine: Arc<ConversationEngine>) {
    info!("Starting polling mode...");

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    let listener = Polling::builder(bot.clone())
        .drop_pending_updates()
        .build();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(listener, LoggingErrorHandler::with_custom_text("Polling error"))
        .await;
}

/// Push mode: register the webhook and serve it, processing each update
/// synchronously within the HTTP request before responding.
pub async fn run_webhook(
    bot: Bot,
    engine: Arc<ConversationEngine>,
    base_url: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let webhook_url = format!("{base_url}/webhook");
    info!("Starting webhook on {webhook_url}");

    let url = reqwest::Url::parse(&webhook_url)?;
    bot.set_webhook(url).drop_pending_updates(true).await?;

    let app = Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(webhook))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_message(msg: Message, engine: Arc<ConversationEngine>) -> ResponseResult<()> {
    match inbound_from_message(&msg) {
        Some(inbound) => engine.handle_update(inbound).await,
        None => info!("Ignoring non-text message in chat {}", msg.chat.id),
    }
    Ok(())
}

async fn liveness() -> &'static str {
    "🤖 Business Consultant Bot is running!"
}

/// Always answers "OK"/200, even for malformed bodies and processing
/// failures, to avoid platform-side redelivery storms.
async fn webhook(State(engine): State<Arc<ConversationEngine>>, body: String) -> &'static str {
    if let Some(inbound) = parse_update(&body) {
        engine.handle_update(inbound).await;
    }
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_json(text: &str) -> String {
        format!(
            r#"{{
                "update_id": 1001,
                "message": {{
                    "message_id": 7,
                    "date": 1700000000,
                    "chat": {{"id": 42, "type": "private", "first_name": "Alice"}},
                    "from": {{"id": 42, "is_bot": false, "first_name": "Alice"}},
                    "text": "{text}"
                }}
            }}"#
        )
    }

    #[test]
    fn test_parse_text_update() {
        let inbound = parse_update(&update_json("hello")).expect("should parse");
        assert_eq!(inbound.chat_id, 42);
        assert_eq!(inbound.user_id, 42);
        assert_eq!(inbound.text, "hello");
    }

    #[test]
    fn test_malformed_body_is_dropped() {
        assert!(parse_update("not json").is_none());
        assert!(parse_update("{}").is_none());
    }

    #[test]
    fn test_non_text_message_is_dropped() {
        let body = r#"{
            "update_id": 1002,
            "message": {
                "message_id": 8,
                "date": 1700000000,
                "chat": {"id": 42, "type": "private", "first_name": "Alice"},
                "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
                "photo": []
            }
        }"#;
        assert!(parse_update(body).is_none());
    }

    #[test]
    fn test_non_message_update_is_dropped() {
        let body = r#"{
            "update_id": 1003,
            "edited_message": {
                "message_id": 9,
                "date": 1700000000,
                "edit_date": 1700000001,
                "chat": {"id": 42, "type": "private", "first_name": "Alice"},
                "from": {"id": 42, "is_bot": false, "first_name": "Alice"},
                "text": "edited"
            }
        }"#;
        assert!(parse_update(body).is_none());
    }
}
