//! Catalog consultant: a Telegram front-end that answers product questions
//! with Google Gemini and attaches a topic picture when the question matches
//! one of a fixed list of conditions.
//!
//! # Overview
//! One incoming message goes through a short, linear pipeline:
//!
//! - the product [`catalog`] is rendered into prompt context,
//! - a [`generation`] backend writes the reply text,
//! - an [`oracle`] judges the message against each entry of the [`topics`]
//!   table in order, and the first hit with an existing image is attached,
//! - the [`composer`] returns the resulting text and optional image, which the
//!   [`bot`] delivers through the [`telegram`] client.
//!
//! Catalog and topic table are loaded once at startup and only read afterwards.

// Re-export for convenience
pub use async_trait::async_trait;

/// Remote generation backends (Google Gemini)
pub mod backends;

/// Telegram polling loop
pub mod bot;

/// Product catalog parsing and rendering
pub mod catalog;

/// Reply composition: generated text plus topic image selection
pub mod composer;

/// Command-line and environment configuration
pub mod config;

/// Error types and handling
pub mod error;

/// Text-generation provider trait
pub mod generation;

/// Yes/no semantic equivalence checks
pub mod oracle;

/// Prompt templates and the fallback reply
pub mod prompts;

/// Telegram Bot API client
pub mod telegram;

/// Topic phrase to image table
pub mod topics;

pub use catalog::{Catalog, ProductRecord};
pub use composer::{ComposedReply, ResponseComposer, ScanMode};
pub use error::{CatalogError, CatalogFormatError, GenerationError};
pub use generation::GenerationProvider;
pub use oracle::{EquivalenceOracle, LlmOracle};
pub use topics::{TopicEntry, TopicIndex};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    }
}
