//! Bot module - conversation orchestration for the business consultant.

pub mod analyzer;
pub mod collector;
pub mod engine;
pub mod formatter;
pub mod message;
pub mod session;
pub mod storage;
pub mod telegram;
pub mod transport;


pub use analyzer::AdvisorClient;
pub use collector::QuestionnaireCollector;
pub use engine::ConversationEngine;
pub use session::InMemorySessionStore;
pub use storage::QueryLog;
pub use telegram::TelegramClient;
