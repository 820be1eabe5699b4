//! Turns one user message into the reply the bot sends back.
//!
//! The pipeline is linear: generate the text, then walk the topic table in
//! order and attach the image of the first topic the oracle accepts and whose
//! asset is on disk.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::{
    generation::GenerationProvider,
    oracle::EquivalenceOracle,
    prompts::{consultant_prompt, FALLBACK_REPLY},
    topics::TopicEntry,
};

/// Text to send plus an optional picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    /// Never empty
    pub text: String,
    /// An asset that existed when it was checked
    pub image_path: Option<PathBuf>,
}

/// How the topic table is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// One check at a time, stopping at the first hit
    #[default]
    Sequential,
    /// All checks in flight at once, resolved by table order afterwards
    Concurrent,
}

/// Stateless orchestrator over a generator and an equivalence oracle.
pub struct ResponseComposer<G, O> {
    generator: G,
    oracle: O,
    fallback: String,
    scan: ScanMode,
}

impl<G: GenerationProvider, O: EquivalenceOracle> ResponseComposer<G, O> {
    pub fn new(generator: G, oracle: O) -> Self {
        Self {
            generator,
            oracle,
            fallback: FALLBACK_REPLY.to_string(),
            scan: ScanMode::default(),
        }
    }

    /// Replaces the reply sent when generation fails. Blank values are ignored.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        if !fallback.trim().is_empty() {
            self.fallback = fallback;
        }
        self
    }

    pub fn with_scan(mut self, scan: ScanMode) -> Self {
        self.scan = scan;
        self
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan
    }

    /// Builds the reply for `utterance`.
    pub async fn compose(
        &self,
        utterance: &str,
        catalog_context: &str,
        topics: &[TopicEntry],
    ) -> ComposedReply {
        let text = self.reply_text(utterance, catalog_context).await;
        let image_path = match self.scan {
            ScanMode::Sequential => self.first_match_sequential(utterance, topics).await,
            ScanMode::Concurrent => self.first_match_concurrent(utterance, topics).await,
        };
        ComposedReply { text, image_path }
    }

    async fn reply_text(&self, utterance: &str, catalog_context: &str) -> String {
        let prompt = consultant_prompt(catalog_context, utterance);
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                log::warn!("generation returned an empty reply, using fallback text");
                self.fallback.clone()
            }
            Err(e) => {
                log::error!("generation failed: {}", e);
                self.fallback.clone()
            }
        }
    }

    async fn first_match_sequential(
        &self,
        utterance: &str,
        topics: &[TopicEntry],
    ) -> Option<PathBuf> {
        for entry in topics {
            if !self.oracle.is_equivalent(utterance, &entry.phrase).await {
                continue;
            }
            if asset_exists(&entry.image_path).await {
                log::info!("matched topic {:?}", entry.phrase);
                return Some(entry.image_path.clone());
            }
            log::warn!(
                "topic {:?} matched but {} is missing",
                entry.phrase,
                entry.image_path.display()
            );
        }
        None
    }

    async fn first_match_concurrent(
        &self,
        utterance: &str,
        topics: &[TopicEntry],
    ) -> Option<PathBuf> {
        let verdicts = join_all(
            topics
                .iter()
                .map(|entry| self.oracle.is_equivalent(utterance, &entry.phrase)),
        )
        .await;

        for (entry, matched) in topics.iter().zip(verdicts) {
            if matched && asset_exists(&entry.image_path).await {
                log::info!("matched topic {:?}", entry.phrase);
                return Some(entry.image_path.clone());
            }
        }
        None
    }
}

async fn asset_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GenerationError, generation::GenerationResult};
    use async_trait::async_trait;

    struct Fixed(GenerationResult);

    #[async_trait]
    impl GenerationProvider for Fixed {
        async fn generate(&self, _prompt: &str) -> GenerationResult {
            self.0.clone()
        }
    }

    struct Never;

    #[async_trait]
    impl EquivalenceOracle for Never {
        async fn is_equivalent(&self, _utterance: &str, _topic_phrase: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn empty_generation_falls_back() {
        let composer = ResponseComposer::new(Fixed(Ok("  \n".into())), Never);
        let reply = composer.compose("?", "", &[]).await;
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(reply.image_path, None);
    }

    #[tokio::test]
    async fn custom_fallback_is_used_on_error() {
        let composer =
            ResponseComposer::new(Fixed(Err(GenerationError::MalformedResponse)), Never)
                .with_fallback("Сервис недоступен");
        let reply = composer.compose("?", "", &[]).await;
        assert_eq!(reply.text, "Сервис недоступен");
    }

    #[test]
    fn blank_fallback_is_ignored() {
        let composer = ResponseComposer::new(Fixed(Ok("x".into())), Never).with_fallback(" ");
        assert_eq!(composer.fallback, FALLBACK_REPLY);
        assert_eq!(composer.scan_mode(), ScanMode::Sequential);
    }
}
