//! Long-polling loop connecting Telegram to the response composer.
//!
//! Each text message is answered in its own task. The catalog context and
//! topic table are built once and shared read-only across tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::{
    composer::{ComposedReply, ResponseComposer},
    error::TelegramError,
    generation::GenerationProvider,
    oracle::EquivalenceOracle,
    telegram::{TelegramClient, Update},
    topics::TopicIndex,
};

/// Pause after a failed `getUpdates` call before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Everything a message handler needs; immutable after startup.
pub struct Bot<G, O> {
    telegram: TelegramClient,
    composer: ResponseComposer<G, O>,
    catalog_context: String,
    topics: TopicIndex,
    poll_timeout: u64,
}

impl<G, O> Bot<G, O>
where
    G: GenerationProvider + 'static,
    O: EquivalenceOracle + 'static,
{
    pub fn new(
        telegram: TelegramClient,
        composer: ResponseComposer<G, O>,
        catalog_context: String,
        topics: TopicIndex,
        poll_timeout: u64,
    ) -> Self {
        Self {
            telegram,
            composer,
            catalog_context,
            topics,
            poll_timeout,
        }
    }

    /// Composes the reply to one utterance.
    pub async fn reply_to(&self, utterance: &str) -> ComposedReply {
        self.composer
            .compose(utterance, &self.catalog_context, self.topics.entries())
            .await
    }

    /// Composes and sends the reply to one chat.
    pub async fn handle_utterance(
        &self,
        chat_id: i64,
        utterance: &str,
    ) -> Result<(), TelegramError> {
        log::info!("chat {}: received {} chars", chat_id, utterance.chars().count());
        let reply = self.reply_to(utterance).await;
        log::debug!(
            "chat {}: replying with image {:?}",
            chat_id,
            reply.image_path.as_ref().map(|p| p.display().to_string())
        );
        self.telegram.deliver(chat_id, &reply).await
    }

    /// Spawns a handler into `handlers` for every text message in `updates`
    /// and returns the next polling offset.
    pub fn dispatch(
        self: &Arc<Self>,
        updates: Vec<Update>,
        offset: Option<i64>,
        handlers: &mut JoinSet<()>,
    ) -> Option<i64> {
        let mut next = offset;
        for update in updates {
            next = Some(next.map_or(update.update_id + 1, |o| o.max(update.update_id + 1)));
            let Some(message) = update.message else {
                continue;
            };
            let Some(utterance) = message.utterance().map(str::to_owned) else {
                log::debug!("ignoring non-text or command update {}", update.update_id);
                continue;
            };
            let bot = Arc::clone(self);
            let chat_id = message.chat.id;
            handlers.spawn(async move {
                if let Err(e) = bot.handle_utterance(chat_id, &utterance).await {
                    log::error!("chat {}: delivering reply failed: {}", chat_id, e);
                }
            });
        }
        next
    }

    /// Polls until Ctrl-C.
    pub async fn run(self: Arc<Self>) {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Polls until `shutdown` resolves, then stops polling and waits for the
    /// replies already in progress. Their updates are acknowledged to
    /// Telegram by the time they run, so dropping them would lose the reply.
    pub async fn run_until(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        log::info!("bot started, polling for updates");
        tokio::pin!(shutdown);
        let mut handlers = JoinSet::new();
        let mut offset = None;
        loop {
            while handlers.try_join_next().is_some() {}

            let poll = self.telegram.get_updates(offset, self.poll_timeout);
            let updates = tokio::select! {
                result = poll => result,
                _ = &mut shutdown => break,
            };
            match updates {
                Ok(updates) => offset = self.dispatch(updates, offset, &mut handlers),
                Err(e) => {
                    log::error!("getUpdates failed: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        _ = &mut shutdown => break,
                    }
                }
            }
        }

        log::info!("shutting down, waiting for {} pending replies", handlers.len());
        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                log::error!("reply task failed: {}", e);
            }
        }
    }
}
