//! Telegram outbound client using teloxide.

use std::fmt;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tracing::warn;

use crate::bot::message::FormatMode;

/// Outbound send failure. Neither variant is retried; when a multi-part
/// message is in flight, remaining fragments are still attempted.
#[derive(Debug)]
pub enum SendError {
    /// The platform rejected or timed out on the call.
    Api(String),
    /// Markdown rendering failed for this fragment (unescaped special
    /// character). Sibling fragments are unaffected.
    Markdown(String),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "delivery failed: {e}"),
            Self::Markdown(e) => write!(f, "markdown formatting rejected: {e}"),
        }
    }
}

impl std::error::Error for SendError {}

/// Uniform outbound primitive. One network call per `send`.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, mode: FormatMode) -> Result<i64, SendError>;

    /// Best-effort "typing..." indicator. Failures are ignored.
    async fn send_typing(&self, _chat_id: i64) {}
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, chat_id: i64, text: &str, mode: FormatMode) -> Result<i64, SendError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if mode == FormatMode::Markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }

        request.await.map(|msg| i64::from(msg.id.0)).map_err(|e| {
            let detail = e.to_string();
            warn!("Failed to send to {chat_id}: {detail}");
            // Telegram reports bad Markdown as an entity-parsing error
            if detail.contains("can't parse entities") {
                SendError::Markdown(detail)
            } else {
                SendError::Api(detail)
            }
        })
    }

    async fn send_typing(&self, chat_id: i64) {
        if let Err(e) = self
            .bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
        {
            warn!("Failed to send typing action to {chat_id}: {e}");
        }
    }
}
