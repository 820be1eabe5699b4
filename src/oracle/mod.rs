//! Semantic-equivalence judgments between a user message and a topic phrase.
//!
//! The judgment is fail-closed: any failure to obtain or read an answer
//! counts as "not equivalent", so a flaky check can only cost the image,
//! never the text reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    generation::GenerationProvider,
    prompts::{equivalence_prompt, AFFIRMATIVE_PREFIXES},
};

/// Decides whether an utterance denotes the same concept as a topic phrase.
#[async_trait]
pub trait EquivalenceOracle: Send + Sync {
    async fn is_equivalent(&self, utterance: &str, topic_phrase: &str) -> bool;
}

#[async_trait]
impl<T: EquivalenceOracle + ?Sized> EquivalenceOracle for &T {
    async fn is_equivalent(&self, utterance: &str, topic_phrase: &str) -> bool {
        (**self).is_equivalent(utterance, topic_phrase).await
    }
}

#[async_trait]
impl<T: EquivalenceOracle + ?Sized> EquivalenceOracle for Arc<T> {
    async fn is_equivalent(&self, utterance: &str, topic_phrase: &str) -> bool {
        (**self).is_equivalent(utterance, topic_phrase).await
    }
}

/// Oracle that asks a generation service for a yes/no answer.
pub struct LlmOracle<P> {
    provider: P,
}

impl<P: GenerationProvider> LlmOracle<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: GenerationProvider> EquivalenceOracle for LlmOracle<P> {
    async fn is_equivalent(&self, utterance: &str, topic_phrase: &str) -> bool {
        let prompt = equivalence_prompt(utterance, topic_phrase);
        match self.provider.generate(&prompt).await {
            Ok(answer) => {
                let verdict = parse_judgment(&answer);
                log::debug!("topic {:?}: answer {:?} -> {}", topic_phrase, answer, verdict);
                verdict
            }
            Err(e) => {
                log::debug!("topic {:?}: equivalence check failed: {}", topic_phrase, e);
                false
            }
        }
    }
}

/// True iff the trimmed, lower-cased answer starts with an affirmative token.
pub fn parse_judgment(answer: &str) -> bool {
    let normalized = answer.trim().to_lowercase();
    AFFIRMATIVE_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GenerationError, generation::GenerationResult};

    struct Canned(GenerationResult);

    #[async_trait]
    impl GenerationProvider for Canned {
        async fn generate(&self, _prompt: &str) -> GenerationResult {
            self.0.clone()
        }
    }

    #[test]
    fn parses_affirmative_answers() {
        assert!(parse_judgment("Да"));
        assert!(parse_judgment("  да.\n"));
        assert!(parse_judgment("Да, точно"));
        assert!(parse_judgment("YES"));
    }

    #[test]
    fn everything_else_is_negative() {
        assert!(!parse_judgment("Нет"));
        assert!(!parse_judgment(""));
        assert!(!parse_judgment("Возможно, да"));
        assert!(!parse_judgment("no"));
    }

    #[tokio::test]
    async fn affirmative_reply_is_equivalent() {
        let oracle = LlmOracle::new(Canned(Ok("Да, точно".into())));
        assert!(oracle.is_equivalent("болит голова", "мигрень").await);
    }

    #[tokio::test]
    async fn failures_are_negative() {
        for err in [
            GenerationError::RequestFailed(503),
            GenerationError::MalformedResponse,
            GenerationError::Transport("reset".into()),
        ] {
            let oracle = LlmOracle::new(Canned(Err(err)));
            assert!(!oracle.is_equivalent("болит голова", "мигрень").await);
        }
    }
}
