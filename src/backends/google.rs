//! Google Gemini client for single-turn text generation.
//!
//! Talks to the `generateContent` REST endpoint. The request carries one
//! user content with one text part, and the reply is the text of the first
//! part of the first candidate. The API key travels in the `x-goog-api-key`
//! header, never in the URL.
//!
//! # Example
//! ```no_run
//! use catalog_consultant::backends::google::Gemini;
//! use catalog_consultant::generation::GenerationProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Gemini::new("your-api-key", None, None)?;
//!     let text = client.generate("Hello!").await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    error::GenerationError,
    generation::{GenerationProvider, GenerationResult},
};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for Google's Gemini `generateContent` API.
pub struct Gemini {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,
    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: String,
    /// API root, overridable for proxies and tests
    pub base_url: String,
    /// Request timeout in seconds; transport default when unset
    pub timeout_seconds: Option<u64>,
    client: Client,
}

/// Request body for generateContent
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

/// Response from generateContent. Every level is optional so that a
/// well-formed JSON body with an unexpected shape is reported as
/// [`GenerationError::MalformedResponse`] instead of a decode failure.
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl Gemini {
    /// Creates a new Gemini client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key
    /// * `model` - Model identifier (defaults to [`DEFAULT_MODEL`])
    /// * `timeout_seconds` - Request timeout; `None` keeps the transport default
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds,
            client,
        })
    }

    /// Points the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{base}/models/{model}:generateContent",
            base = self.base_url,
            model = self.model
        )
    }
}

#[async_trait]
impl GenerationProvider for Gemini {
    async fn generate(&self, prompt: &str) -> GenerationResult {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Gemini request payload: {}", json);
            }
        }

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("Gemini HTTP status: {}", status);
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            log::debug!("Gemini error body: {}", detail);
            return Err(GenerationError::RequestFailed(status.as_u16()));
        }

        let raw = resp.text().await?;
        log::trace!("Gemini response payload: {}", raw);
        let parsed: GeminiResponse =
            serde_json::from_str(&raw).map_err(|_| GenerationError::MalformedResponse)?;
        parsed
            .into_first_text()
            .ok_or(GenerationError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = r"^/models/gemini-2\.0-flash:generateContent";

    async fn client_for(server: &Server) -> Gemini {
        Gemini::new("test-key", None, None)
            .unwrap()
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn test_generate_returns_first_part_verbatim() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "parts": [{ "text": "Привет" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "parts": [{ "text": " Здравствуйте!\n" }, { "text": "ignored" }]
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server).await;
        let text = client.generate("Привет").await.unwrap();
        assert_eq!(text, " Здравствуйте!\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_request_failed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(
            client.generate("hi").await,
            Err(GenerationError::RequestFailed(500))
        );
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(
            client.generate("hi").await,
            Err(GenerationError::MalformedResponse)
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex(PATH.into()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(
            client.generate("hi").await,
            Err(GenerationError::MalformedResponse)
        );
    }

    #[tokio::test]
    async fn test_empty_api_key_skips_the_request() {
        let client = Gemini::new("", None, None).unwrap();
        assert_eq!(
            client.generate("hi").await,
            Err(GenerationError::MissingApiKey)
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_the_api_key() {
        let client = Gemini::new("SUPER-SECRET-KEY", None, Some(5))
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        match client.generate("hi").await {
            Err(GenerationError::Transport(message)) => {
                assert!(
                    !message.contains("SUPER-SECRET-KEY"),
                    "API key in error: {message}"
                );
            }
            other => panic!("Expected Transport error, got: {other:?}"),
        }
    }

    #[test]
    fn test_custom_model_and_base_url_shape_the_endpoint() {
        let client = Gemini::new("k", Some("gemini-1.5-pro".into()), Some(5))
            .unwrap()
            .with_base_url("http://localhost:9000/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
