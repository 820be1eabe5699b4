use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use catalog_consultant::{
    backends::google::Gemini,
    bot::Bot,
    catalog::Catalog,
    composer::ResponseComposer,
    config::Settings,
    init_logging,
    oracle::LlmOracle,
    telegram::TelegramClient,
    topics::TopicIndex,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let settings = Settings::parse();
    settings.validate()?;

    let catalog = Catalog::load(&settings.catalog)
        .with_context(|| format!("loading catalog {}", settings.catalog.display()))?;
    if catalog.is_empty() {
        log::warn!("catalog {} has no products", settings.catalog.display());
    } else {
        log::info!("loaded {} products", catalog.len());
    }
    let topics = TopicIndex::rooted_at(&settings.assets_dir);

    let gemini = Arc::new(
        Gemini::new(
            settings.gemini_api_key.clone(),
            Some(settings.model.clone()),
            settings.timeout_seconds,
        )?
        .with_base_url(settings.gemini_base_url.clone()),
    );
    let composer = ResponseComposer::new(Arc::clone(&gemini), LlmOracle::new(gemini))
        .with_scan(settings.scan_mode());

    let telegram = TelegramClient::new(settings.telegram_token.clone())?
        .with_base_url(settings.telegram_base_url.clone());

    let bot = Arc::new(Bot::new(
        telegram,
        composer,
        catalog.render_context(),
        topics,
        settings.poll_timeout,
    ));
    bot.run().await;
    Ok(())
}
