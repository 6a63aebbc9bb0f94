use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn, Instrument};
use tracing_subscriber::EnvFilter;

mod config;
mod content;
mod history;
mod image;
mod io;
mod pipeline;
mod prompts;
mod providers;
mod render;
mod retry;
mod social;
mod style;
mod topic;
#[cfg(test)]
mod test_support;

use config::{Config, ProviderKind};
use image::{ImageSource, NoImage, Unsplash};
use pipeline::{run_once, Pipeline, SocialSource};
use providers::{MockGenerator, OpenAIChat, TextGenerator};
use social::ProfileScraper;

/// Generate one blog post as a static HTML page.
#[derive(Parser, Debug)]
#[command(name = "blogen", version)]
struct Cli {
    /// YAML config file (defaults to ./blogen.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the HTML file is written to
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Text provider: openai | mock
    #[arg(long)]
    provider: Option<ProviderKind>,
    /// Derive the topic from recent social captions (deprecated)
    #[arg(long)]
    social: bool,
    /// Search phrase for the header image
    #[arg(long)]
    image_query: Option<String>,
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn build_pipeline(cfg: &Config) -> Result<Pipeline> {
    let generator: Arc<dyn TextGenerator> = match cfg.llm.provider {
        ProviderKind::OpenAI => {
            let key = env_key(&cfg.llm.api_key_env)
                .with_context(|| format!("{} not set", cfg.llm.api_key_env))?;
            Arc::new(OpenAIChat::new(cfg.llm.base_url.clone(), key, cfg.llm.model.clone()))
        }
        ProviderKind::Mock => Arc::new(MockGenerator),
    };

    let images: Arc<dyn ImageSource> = match (cfg.llm.provider, env_key(&cfg.image.access_key_env)) {
        (ProviderKind::OpenAI, Some(key)) => Arc::new(Unsplash::new(cfg.image.base_url.clone(), key)),
        (ProviderKind::OpenAI, None) => {
            warn!("{} not set, posts will have no image", cfg.image.access_key_env);
            Arc::new(NoImage)
        }
        (ProviderKind::Mock, _) => Arc::new(NoImage),
    };

    let social = if cfg.social.enabled {
        match env_key(&cfg.social.username_env) {
            Some(username) => Some(SocialSource { scraper: ProfileScraper::new(cfg.social.base_url.clone()), username }),
            None => {
                warn!("{} not set, skipping social topic", cfg.social.username_env);
                None
            }
        }
    } else {
        None
    };

    Ok(Pipeline { generator, images, social })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogen=info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref()).await?;
    cfg.apply_env()?;
    if let Some(dir) = cli.out_dir { cfg.output.out_dir = dir; }
    if let Some(p) = cli.provider { cfg.llm.provider = p; }
    if let Some(q) = cli.image_query { cfg.image.query = q; }
    if cli.social { cfg.social.enabled = true; }
    cfg.validate()?;

    let deps = build_pipeline(&cfg)?;
    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    let span = tracing::info_span!("run", %run_id, provider = deps.generator.name(), images = deps.images.name());

    let mut rng = StdRng::from_os_rng();
    let outcome = run_once(&cfg, &deps, &mut rng).instrument(span).await?;

    info!(topic = %outcome.topic, style = outcome.style, image = !outcome.image_url.is_empty(), "done");
    println!("Blog post generated and saved as {}", outcome.path.display());
    Ok(())
}
