//! Message types and command parsing.

use teloxide::utils::command::BotCommands;

/// How an outbound message should be rendered by Telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    Plain,
    Markdown,
}

/// One normalized inbound update. Ephemeral, not persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Chat the reply goes back to.
    pub chat_id: i64,
    /// Session key. Equal to `chat_id` in private chats.
    pub user_id: i64,
    pub text: String,
}

/// One outbound message before chunking.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub mode: FormatMode,
}

impl OutboundMessage {
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), mode: FormatMode::Plain }
    }

    pub fn markdown(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), mode: FormatMode::Markdown }
    }
}

/// Recognized bot commands. Commands always pre-empt data collection:
/// anything starting with `/` never reaches the free-text path.
#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Begin a new consultation.
    Start,
    /// Show help.
    Help,
    /// Cancel the current conversation.
    Cancel,
}

/// Route an inbound text to a command or the free-text path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    /// Starts with `/` but is not a recognized command. Dropped with a log.
    UnknownCommand,
    FreeText,
}

pub fn route(text: &str, bot_username: &str) -> Route {
    if !text.starts_with('/') {
        return Route::FreeText;
    }
    match Command::parse(text, bot_username) {
        Ok(cmd) => Route::Command(cmd),
        Err(_) => Route::UnknownCommand,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_known_commands() {
        assert_eq!(route("/start", "bizbot"), Route::Command(Command::Start));
        assert_eq!(route("/help", "bizbot"), Route::Command(Command::Help));
        assert_eq!(route("/cancel", "bizbot"), Route::Command(Command::Cancel));
    }

    #[test]
    fn test_routes_commands_with_bot_mention() {
        assert_eq!(route("/start@bizbot", "bizbot"), Route::Command(Command::Start));
    }

    #[test]
    fn test_mention_for_other_bot_is_not_ours() {
        assert_eq!(route("/start@otherbot", "bizbot"), Route::UnknownCommand);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(route("/frobnicate", "bizbot"), Route::UnknownCommand);
    }

    #[test]
    fn test_free_text() {
        assert_eq!(route("a coffee shop in Berlin", "bizbot"), Route::FreeText);
        assert_eq!(route("", "bizbot"), Route::FreeText);
    }

    #[test]
    fn test_slash_mid_text_is_free_text() {
        assert_eq!(route("around 50/50 split", "bizbot"), Route::FreeText);
    }
}
