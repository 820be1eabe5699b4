use std::sync::Arc;
use std::time::Duration;

use catalog_consultant::{
    async_trait,
    bot::Bot,
    composer::ResponseComposer,
    generation::{GenerationProvider, GenerationResult},
    oracle::EquivalenceOracle,
    telegram::TelegramClient,
    topics::TopicIndex,
};
use mockito::{Matcher, Server};
use serde_json::json;
use tokio::sync::Notify;

// Signals when a reply starts, then takes a while to produce it
struct SlowGenerator {
    started: Arc<Notify>,
}

#[async_trait]
impl GenerationProvider for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> GenerationResult {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok("Ответ".to_string())
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
async fn test_shutdown_waits_for_replies_in_progress() {
    let mut telegram = Server::new_async().await;

    // First poll carries no offset and returns one message; later polls are empty
    let _first_poll = telegram
        .mock("POST", "/bot42:token/getUpdates")
        .match_body(Matcher::Regex(r#"^\{"timeout""#.into()))
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 5,
                        "message": { "message_id": 1, "chat": { "id": 7 }, "text": "мигрень" }
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _later_polls = telegram
        .mock("POST", "/bot42:token/getUpdates")
        .match_body(Matcher::Regex(r#""offset":6"#.into()))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":[]}"#)
        .create_async()
        .await;
    let sent = telegram
        .mock("POST", "/bot42:token/sendMessage")
        .match_body(Matcher::PartialJson(json!({ "chat_id": 7, "text": "Ответ" })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":2}}"#)
        .expect(1)
        .create_async()
        .await;

    let started = Arc::new(Notify::new());
    let composer = ResponseComposer::new(
        SlowGenerator {
            started: Arc::clone(&started),
        },
        Never,
    );
    let client = TelegramClient::new("42:token")
        .unwrap()
        .with_base_url(telegram.url());
    let bot = Arc::new(Bot::new(
        client,
        composer,
        String::new(),
        TopicIndex::new(Vec::new()),
        0,
    ));

    // Shut down as soon as the reply is being composed
    let shutdown = async move { started.notified().await };
    tokio::time::timeout(Duration::from_secs(10), bot.run_until(shutdown))
        .await
        .expect("bot did not shut down");

    sent.assert_async().await;
}
