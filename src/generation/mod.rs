use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;

/// Outcome of a single generation call.
pub type GenerationResult = Result<String, GenerationError>;

/// Trait for services that turn a prompt into generated text.
///
/// One call is one single-turn request. Implementations do not retry and
/// report failures as [`GenerationError`] values rather than panicking.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Sends `prompt` and returns the first generated text span verbatim.
    async fn generate(&self, prompt: &str) -> GenerationResult;
}

#[async_trait]
impl<T: GenerationProvider + ?Sized> GenerationProvider for Arc<T> {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<T: GenerationProvider + ?Sized> GenerationProvider for Box<T> {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<T: GenerationProvider + ?Sized> GenerationProvider for &T {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        (**self).generate(prompt).await
    }
}
