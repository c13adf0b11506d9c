//! The morning run: signals, prompt, model, optional image, scheduled draft.
//!
//! Failure policy in one place: account lookup, text generation, and the
//! publish call are hard failures that abort the run. Everything feeding the
//! prompt (market, news) and everything about the image (picking, reading,
//! uploading, processing) only warns and the run keeps going. A morning post
//! that says less still beats no post.

use crate::images::ImagePicker;
use anyhow::Result;
use daybreak_config::{DaybreakConfig, SignalSource, SignalsConfig, VariantSpec};
use daybreak_llm::build_llm_client;
use daybreak_llm::prompt::{MorningContext, MorningPrompt};
use daybreak_signals::{MarketApi, MarketSnapshot, NewsApi};
use daybreak_social::typefully::{MediaReadiness, TypefullyClient};
use serde::Serialize;
use std::path::Path;

/// Fetch a few more headlines than the prompt will quote, so dropped blanks
/// do not leave it short.
const NEWS_FETCH_LIMIT: usize = 5;

/// Everything `run` needs besides options: the loaded config and a publisher
/// client built from it.
pub struct RunDeps<'a> {
    pub cfg: &'a DaybreakConfig,
    pub publisher: TypefullyClient,
}

impl<'a> RunDeps<'a> {
    pub fn from_config(cfg: &'a DaybreakConfig) -> Result<Self> {
        let publisher = TypefullyClient::new(
            cfg.publisher.api_key.clone(),
            Some(&cfg.publisher.endpoint),
        )?;
        Ok(Self { cfg, publisher })
    }
}

#[derive(Debug, Default)]
pub struct RunOptions {
    /// Variant id to run; `None` means the first enabled one.
    pub variant: Option<String>,
    /// Do everything except publish the draft.
    pub dry_run: bool,
    /// Skip the image branch entirely.
    pub no_image: bool,
}

/// What one run did, for the log and the console.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub variant: String,
    pub social_set: String,
    pub text: String,
    pub media_id: Option<String>,
    pub draft_id: Option<String>,
    pub dry_run: bool,
}

pub async fn run(deps: &RunDeps<'_>, opts: &RunOptions) -> Result<RunReport> {
    let cfg = deps.cfg;
    let variant = cfg.select_variant(opts.variant.as_deref())?;
    tracing::info!(
        variant = %variant.id,
        signals = variant.signals.as_str(),
        provider = variant.llm.provider_name(),
        dry_run = opts.dry_run,
        "starting morning run"
    );

    // Account lookup. A key that cannot post anywhere is a hard stop.
    let social_set = deps.publisher.first_social_set().await?;

    // Context gathering never kills the run; the prompt copes with gaps.
    let context = gather_context(&cfg.signals, variant).await;

    let llm = build_llm_client(&variant.llm)?;
    let mut prompt = MorningPrompt::new(context);
    if let Some(persona) = &variant.persona {
        prompt = prompt.with_persona(persona.as_str());
    }
    if let Some(examples) = &variant.style_examples {
        prompt = prompt.with_style_examples(examples.clone());
    }
    let text = llm
        .compose_post(&prompt, variant.llm.max_tokens(), variant.llm.temperature())
        .await?;

    let media_id = if opts.no_image || !cfg.images.enabled {
        tracing::info!("image branch disabled for this run");
        None
    } else {
        attach_image(&deps.publisher, &social_set.id, Path::new(&cfg.images.dir)).await
    };

    let draft_id = if opts.dry_run {
        tracing::info!(
            text = %text,
            media = media_id.as_deref().unwrap_or("-"),
            "dry run, skipping publish"
        );
        None
    } else {
        let draft = deps
            .publisher
            .create_draft(&social_set.id, &text, media_id.clone().map(|id| vec![id]))
            .await?;
        if let Some(url) = &draft.share_url {
            tracing::info!(share_url = %url, "draft visible at");
        }
        draft.id
    };

    let report = RunReport {
        variant: variant.id.clone(),
        social_set: social_set.id,
        text,
        media_id,
        draft_id,
        dry_run: opts.dry_run,
    };
    tracing::info!(
        variant = %report.variant,
        chars = report.text.len(),
        media = report.media_id.as_deref().unwrap_or("-"),
        draft = report.draft_id.as_deref().unwrap_or("-"),
        "morning run finished"
    );
    Ok(report)
}

async fn gather_context(signals: &SignalsConfig, variant: &VariantSpec) -> MorningContext {
    let mut context = MorningContext::today();
    match variant.signals {
        SignalSource::Market => {
            context.market = Some(fetch_market(signals).await);
            context.headlines = fetch_headlines(signals).await;
        }
        SignalSource::News => {
            context.headlines = fetch_headlines(signals).await;
        }
        SignalSource::Social => {
            context.live_search = true;
        }
    }
    context
}

async fn fetch_market(signals: &SignalsConfig) -> MarketSnapshot {
    let api = match MarketApi::new(Some(&signals.market_endpoint)) {
        Ok(api) => api,
        Err(err) => {
            tracing::warn!(error = %err, "market endpoint misconfigured, going neutral");
            return MarketSnapshot::neutral();
        }
    };
    match api.global_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, "market data unavailable, going neutral");
            MarketSnapshot::neutral()
        }
    }
}

async fn fetch_headlines(signals: &SignalsConfig) -> Vec<String> {
    let api = match NewsApi::new(Some(&signals.news_endpoint), signals.news_auth_token.clone()) {
        Ok(api) => api,
        Err(err) => {
            tracing::warn!(error = %err, "news endpoint misconfigured, posting without headlines");
            return Vec::new();
        }
    };
    match api.top_headlines(NEWS_FETCH_LIMIT).await {
        Ok(headlines) => headlines,
        Err(err) => {
            tracing::warn!(error = %err, "news unavailable, posting without headlines");
            Vec::new()
        }
    }
}

/// The whole image branch. Any miss along the way returns `None`, and `None`
/// means the draft simply carries no media identifier.
async fn attach_image(publisher: &TypefullyClient, set_id: &str, dir: &Path) -> Option<String> {
    let image = ImagePicker::new(dir).pick()?;
    let bytes = match tokio::fs::read(&image.path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(
                path = %image.path.display(),
                error = %err,
                "could not read image, posting without media"
            );
            return None;
        }
    };
    match publisher
        .upload_media(set_id, &image.file_name, bytes, image.content_type)
        .await
    {
        Ok(MediaReadiness::Ready(id)) => {
            tracing::info!(media_id = %id, file = %image.file_name, "image attached");
            Some(id)
        }
        Ok(MediaReadiness::Failed) => {
            tracing::warn!(file = %image.file_name, "media processing failed, posting without it");
            None
        }
        Ok(MediaReadiness::TimedOut) => {
            tracing::warn!(file = %image.file_name, "media never became ready, posting without it");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "image upload failed, posting without it");
            None
        }
    }
}
