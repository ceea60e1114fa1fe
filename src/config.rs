use std::fmt;
use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    MissingVar(&'static str),
    /// PORT is set but is not a valid port number.
    InvalidPort { value: String, source: std::num::ParseIntError },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => {
                write!(f, "required environment variable {} is not set", name)
            }
            Self::InvalidPort { value, source } => {
                write!(f, "invalid PORT value '{}': {}", value, source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPort { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Default listen port for webhook mode.
const DEFAULT_PORT: u16 = 5000;

pub struct Config {
    pub telegram_bot_token: String,
    pub anthropic_api_key: String,
    /// Externally reachable base URL. Present = webhook mode, absent = polling mode.
    pub webhook_url: Option<String>,
    /// Listen port for webhook mode.
    pub port: u16,
    /// Directory for state files (query log, logs).
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?;

        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "TELEGRAM_BOT_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let anthropic_api_key = var("ANTHROPIC_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("ANTHROPIC_API_KEY"))?;

        let webhook_url = var("WEBHOOK_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidPort { value, source: e })?,
            None => DEFAULT_PORT,
        };

        let data_dir = var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token,
            anthropic_api_key,
            webhook_url,
            port,
            data_dir,
        })
    }
}
