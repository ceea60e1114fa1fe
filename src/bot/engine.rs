//! Conversation engine: command routing and the per-user state machine.
//!
//! A user is IDLE (no session in the store) or COLLECTING (session present).
//! Completion, /cancel, and unrecoverable errors all end back at IDLE with
//! the session removed. The analyzing phase is transient: the session leaves
//! the store the moment collection completes, so a duplicate update arriving
//! mid-analysis sees IDLE.
//!
//! `handle_update` is also the process-wide fallback boundary: nothing in
//! here propagates a failure to the transport layer.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::bot::collector::{CollectedData, Collector, CollectorStep};
use crate::bot::formatter::split_message;
use crate::bot::message::{Command, InboundMessage, OutboundMessage, Route, route};
use crate::bot::session::{SessionStore, UserSession};
use crate::bot::storage::{QueryRecord, RecordSink};
use crate::bot::telegram::{MessageSender, SendError};
use crate::bot::analyzer::Analyzer;

pub(crate) const WELCOME: &str = "🤖 *AI Business Consultant*\n\nLet's get started! I'll ask a few questions about your business idea.";
pub(crate) const START_FIRST: &str = "Start with /start";
pub(crate) const COLLECTED_ACK: &str = "✅ *Data collected! Analyzing...*";
pub(crate) const CANCELLED: &str = "❌ Conversation cancelled. /start - begin again";
pub(crate) const PROCESSING_FAILED: &str = "❌ Processing failed. /start - begin again";
pub(crate) const HELP: &str = "📖 *AI Business Consultant*\n\n/start - Begin a consultation\n/help - Show this help\n/cancel - Cancel the current conversation";

/// Builds a fresh collector for each new conversation.
pub type CollectorFactory = Box<dyn Fn() -> Box<dyn Collector> + Send + Sync>;

pub struct ConversationEngine {
    sessions: Arc<dyn SessionStore>,
    sender: Arc<dyn MessageSender>,
    analyzer: Arc<dyn Analyzer>,
    sink: Arc<dyn RecordSink>,
    new_collector: CollectorFactory,
    bot_username: String,
}

impl ConversationEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        sender: Arc<dyn MessageSender>,
        analyzer: Arc<dyn Analyzer>,
        sink: Arc<dyn RecordSink>,
        new_collector: CollectorFactory,
        bot_username: String,
    ) -> Self {
        Self { sessions, sender, analyzer, sink, new_collector, bot_username }
    }

    /// Dispatch one inbound update. Never fails: every error below this point
    /// is logged and converted to at most one user-safe message, so the
    /// transport can always acknowledge the update.
    pub async fn handle_update(&self, msg: InboundMessage) {
        info!(
            "📨 user {}: \"{}\"",
            msg.user_id,
            msg.text.chars().take(50).collect::<String>()
        );

        match route(&msg.text, &self.bot_username) {
            Route::Command(Command::Start) => self.cmd_start(&msg).await,
            Route::Command(Command::Help) => self.cmd_help(&msg).await,
            Route::Command(Command::Cancel) => self.cmd_cancel(&msg).await,
            Route::UnknownCommand => {
                debug!("Ignoring unrecognized command from user {}", msg.user_id);
            }
            Route::FreeText => self.handle_text(&msg).await,
        }
    }

    /// `/start`: discard any in-progress conversation and begin fresh.
    async fn cmd_start(&self, msg: &InboundMessage) {
        if self.sessions.remove(msg.user_id) {
            info!("Discarding in-progress session for user {}", msg.user_id);
        }

        let mut collector = (self.new_collector)();
        let first_question = collector.start_conversation();
        self.sessions.put(msg.user_id, UserSession::new(collector));

        self.deliver(OutboundMessage::markdown(msg.chat_id, WELCOME)).await;
        self.deliver(OutboundMessage::plain(msg.chat_id, first_question)).await;
    }

    /// `/help`: stateless, leaves any session untouched.
    async fn cmd_help(&self, msg: &InboundMessage) {
        self.deliver(OutboundMessage::markdown(msg.chat_id, HELP)).await;
    }

    /// `/cancel`: idempotent; always acknowledged.
    async fn cmd_cancel(&self, msg: &InboundMessage) {
        if self.sessions.remove(msg.user_id) {
            info!("Cancelled conversation for user {}", msg.user_id);
        }
        self.deliver(OutboundMessage::plain(msg.chat_id, CANCELLED)).await;
    }

    /// Free text: advance the user's collector, or tell them to /start.
    async fn handle_text(&self, msg: &InboundMessage) {
        let Some(mut session) = self.sessions.take(msg.user_id) else {
            self.deliver(OutboundMessage::plain(msg.chat_id, START_FIRST)).await;
            return;
        };

        match session.collector.process_user_input(&msg.text) {
            Ok(CollectorStep::Ask(prompt)) => {
                self.sessions.put(msg.user_id, session);
                self.deliver(OutboundMessage::plain(msg.chat_id, prompt)).await;
            }
            Ok(CollectorStep::Complete(data)) => {
                // Session stays out of the store from here on; completion,
                // like failure, ends at IDLE.
                self.analyze_and_reply(msg, data).await;
            }
            Err(e) => {
                error!("Collector failed for user {}: {e}", msg.user_id);
                self.deliver(OutboundMessage::plain(msg.chat_id, PROCESSING_FAILED)).await;
            }
        }
    }

    /// The COLLECTING -> IDLE transition: acknowledge, analyze, reply,
    /// best-effort persistence write.
    async fn analyze_and_reply(&self, msg: &InboundMessage, data: CollectedData) {
        self.deliver(OutboundMessage::markdown(msg.chat_id, COLLECTED_ACK)).await;
        self.sender.send_typing(msg.chat_id).await;

        // May run for minutes; blocks this user's conversation only.
        let advice = match self.analyzer.generate_advice(&data).await {
            Ok(advice) => advice,
            Err(e) => {
                error!("Analyzer failed for user {}: {e}", msg.user_id);
                self.deliver(OutboundMessage::plain(msg.chat_id, PROCESSING_FAILED)).await;
                return;
            }
        };

        let reply = format!(
            "🎯 *RECOMMENDATIONS:*\n\n{advice}\n\n---\n💡 /start - new consultation"
        );
        self.deliver(OutboundMessage::markdown(msg.chat_id, reply)).await;

        if let Err(e) = self.sink.add_record(QueryRecord::new(msg.user_id, data, &advice)) {
            warn!("Failed to log query for user {}: {e}", msg.user_id);
        }
    }

    /// Send one logical message, chunked to the platform limit. Fragment
    /// failures are logged and do not stop later fragments.
    async fn deliver(&self, out: OutboundMessage) {
        for part in split_message(&out.text) {
            match self.sender.send(out.chat_id, &part, out.mode).await {
                Ok(_) => {}
                Err(SendError::Markdown(e)) => {
                    warn!("Fragment formatting failed for chat {}: {e}", out.chat_id);
                }
                Err(SendError::Api(e)) => {
                    warn!("Fragment delivery failed for chat {}: {e}", out.chat_id);
                }
            }
        }
    }
}
