//! Process configuration: command-line flags with environment fallbacks.
//!
//! Both secrets are required, so a missing `GEMINI_API_KEY` or
//! `TELEGRAM_BOT_TOKEN` stops the process during argument parsing, before
//! the catalog is read or the first update is polled.

use std::path::PathBuf;

use clap::Parser;

use crate::{backends::google, composer::ScanMode, error::ConfigError, telegram};

/// Telegram product consultant backed by Google Gemini
#[derive(Parser, Debug, Clone)]
#[command(name = "consultant-bot", version, about)]
pub struct Settings {
    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_token: String,

    /// Product catalog file
    #[arg(long, env = "CONSULTANT_CATALOG", default_value = "products.txt")]
    pub catalog: PathBuf,

    /// Directory the topic images (`images/*.png`) are resolved against
    #[arg(long, env = "CONSULTANT_ASSETS_DIR", default_value = ".")]
    pub assets_dir: PathBuf,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = google::DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API root
    #[arg(long, default_value = google::DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    /// Telegram Bot API root
    #[arg(long, default_value = telegram::DEFAULT_BASE_URL)]
    pub telegram_base_url: String,

    /// Timeout for Gemini requests in seconds (transport default when unset)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Long-poll timeout for getUpdates in seconds
    #[arg(long, default_value_t = 30)]
    pub poll_timeout: u64,

    /// Check all topics at once instead of one by one
    #[arg(long)]
    pub concurrent_topics: bool,
}

impl Settings {
    /// Rejects values clap accepts but the bot cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret("GEMINI_API_KEY"));
        }
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::MissingSecret("TELEGRAM_BOT_TOKEN"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "model",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid {
                name: "timeout-seconds",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn scan_mode(&self) -> ScanMode {
        if self.concurrent_topics {
            ScanMode::Concurrent
        } else {
            ScanMode::Sequential
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Settings, clap::Error> {
        Settings::try_parse_from(std::iter::once("consultant-bot").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_apply() {
        let settings = parse(&["--gemini-api-key", "g", "--telegram-token", "t"]).unwrap();
        assert_eq!(settings.catalog, PathBuf::from("products.txt"));
        assert_eq!(settings.model, google::DEFAULT_MODEL);
        assert_eq!(settings.poll_timeout, 30);
        assert_eq!(settings.scan_mode(), ScanMode::Sequential);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn blank_secret_fails_validation() {
        let settings = parse(&["--gemini-api-key", " ", "--telegram-token", "t"]).unwrap();
        assert_eq!(
            settings.validate(),
            Err(ConfigError::MissingSecret("GEMINI_API_KEY"))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = parse(&[
            "--gemini-api-key",
            "g",
            "--telegram-token",
            "t",
            "--timeout-seconds",
            "0",
            "--concurrent-topics",
        ])
        .unwrap();
        assert_eq!(settings.scan_mode(), ScanMode::Concurrent);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { name: "timeout-seconds", .. })
        ));
    }
}
