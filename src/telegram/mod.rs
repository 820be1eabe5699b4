//! Minimal Telegram Bot API client: long polling plus text and photo replies.
//!
//! Only the handful of methods the bot needs are implemented (`getUpdates`,
//! `sendMessage`, `sendPhoto`). Responses are decoded from the Bot API
//! envelope `{ "ok": ..., "result": ..., "description": ... }`.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{composer::ComposedReply, error::TelegramError};

/// Public Bot API root.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
/// Longest text a single `sendMessage` accepts, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;
/// Longest photo caption, in UTF-16 code units.
pub const MAX_CAPTION_UNITS: usize = 1024;

/// Extra time on top of the long-poll timeout before the HTTP call gives up.
const POLL_MARGIN_SECS: u64 = 10;

/// An incoming update. Only message updates are requested.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Message {
    /// The text of a plain text message; `None` for media and `/commands`.
    pub fn utterance(&self) -> Option<&str> {
        let text = self.text.as_deref()?;
        if text.starts_with('/') || text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Bot API response envelope
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Sent message as returned by the API; only the id is kept.
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Client bound to one bot token.
pub struct TelegramClient {
    token: String,
    base_url: String,
    client: Client,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self, TelegramError> {
        Ok(Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::builder().build()?,
        })
    }

    /// Points the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Long-polls for new message updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let resp = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(poll_request_timeout(timeout_secs))
            .json(&body)
            .send()
            .await?;
        unwrap_envelope(resp).await
    }

    /// Sends `text`, split into as many messages as the length limit requires.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        for chunk in split_utf16(text, MAX_MESSAGE_UNITS) {
            let resp = self
                .client
                .post(self.method_url("sendMessage"))
                .json(&SendMessageRequest {
                    chat_id,
                    text: &chunk,
                })
                .send()
                .await?;
            let _: SentMessage = unwrap_envelope(resp).await?;
        }
        Ok(())
    }

    /// Uploads a local image with an optional caption.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), TelegramError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", Part::bytes(bytes).file_name(file_name));
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let resp = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        let _: SentMessage = unwrap_envelope(resp).await?;
        Ok(())
    }

    /// Sends a composed reply: photo with caption when an image is attached,
    /// plain text otherwise.
    ///
    /// A reply too long for a caption goes out as an uncaptioned photo
    /// followed by the text. If the photo upload fails the text is still sent.
    pub async fn deliver(&self, chat_id: i64, reply: &ComposedReply) -> Result<(), TelegramError> {
        let Some(image) = reply.image_path.as_deref() else {
            return self.send_message(chat_id, &reply.text).await;
        };

        if utf16_len(&reply.text) <= MAX_CAPTION_UNITS {
            match self.send_photo(chat_id, image, Some(&reply.text)).await {
                Ok(()) => return Ok(()),
                Err(e) => log::warn!("sending photo {} failed: {}", image.display(), e),
            }
        } else if let Err(e) = self.send_photo(chat_id, image, None).await {
            log::warn!("sending photo {} failed: {}", image.display(), e);
        }
        self.send_message(chat_id, &reply.text).await
    }
}

async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, TelegramError> {
    let status = resp.status();
    let envelope: ApiResponse<T> = resp
        .json()
        .await
        .map_err(|e| {
            TelegramError::Http(format!("status {}: {}", status, e.without_url()))
        })?;
    match (envelope.ok, envelope.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(TelegramError::Api {
            code: envelope.error_code.unwrap_or(i64::from(status.as_u16())),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        }),
    }
}

/// HTTP timeout for a long poll of `timeout_secs`.
fn poll_request_timeout(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs.saturating_add(POLL_MARGIN_SECS))
}

/// Text length as Telegram counts it.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Splits on char boundaries into pieces of at most `max` UTF-16 code units.
fn split_utf16(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut units = 0;
    for ch in text.chars() {
        let width = ch.len_utf16();
        if units + width > max && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            units = 0;
        }
        current.push(ch);
        units += width;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
