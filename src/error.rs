use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service answered with a non-success HTTP status
    #[error("generation request failed with status {0}")]
    RequestFailed(u16),
    /// The service answered 2xx but the payload had no generated text where expected
    #[error("generation response did not contain generated text")]
    MalformedResponse,
    /// The request never produced an HTTP status (connection, TLS, timeout...)
    #[error("generation transport error: {0}")]
    Transport(String),
    /// No API key was configured for the backend
    #[error("missing API key for the generation service")]
    MissingApiKey,
}

/// Converts reqwest HTTP errors into GenerationErrors.
///
/// The URL is stripped from the message: request URLs may carry credentials.
impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GenerationError::RequestFailed(status.as_u16())
        } else if err.is_decode() {
            GenerationError::MalformedResponse
        } else {
            GenerationError::Transport(err.without_url().to_string())
        }
    }
}

/// A catalog block that the strict parser refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("catalog block {block}: {reason}")]
pub struct CatalogFormatError {
    /// 1-based index of the offending block
    pub block: usize,
    /// What was wrong with it
    pub reason: String,
}

/// Errors raised while loading the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] CatalogFormatError),
}

/// Errors from the Telegram Bot API boundary.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request/response errors
    #[error("HTTP Error: {0}")]
    Http(String),
    /// The Bot API answered `ok: false`
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
    /// Reading a local file for upload failed
    #[error("IO Error: {0}")]
    Io(String),
}

/// The bot token is part of every Bot API URL, so the URL is never kept.
impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url().to_string())
    }
}

impl From<std::io::Error> for TelegramError {
    fn from(err: std::io::Error) -> Self {
        TelegramError::Io(err.to_string())
    }
}

/// Startup configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required secret {0} is empty")]
    MissingSecret(&'static str),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
