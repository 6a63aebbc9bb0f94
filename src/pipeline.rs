use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config::Config;
use crate::content::generate_article;
use crate::history::TopicHistory;
use crate::image::ImageSource;
use crate::io::save_post;
use crate::providers::TextGenerator;
use crate::render::{render_html, BlogPost};
use crate::social::{topic_from_captions, ProfileScraper};
use crate::style::pick_style;
use crate::topic::select_topic;

pub struct SocialSource {
    pub scraper: ProfileScraper,
    pub username: String,
}

pub struct Pipeline {
    pub generator: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageSource>,
    pub social: Option<SocialSource>,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub topic: String,
    pub style: &'static str,
    pub image_url: String,
    pub path: PathBuf,
}

/// One post, start to finish: topic, style, article, image, page.
pub async fn run_once(cfg: &Config, deps: &Pipeline, rng: &mut StdRng) -> Result<RunOutcome> {
    let mut history = match TopicHistory::load(&cfg.topics.history_path).await {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, path = %cfg.topics.history_path.display(), "unreadable topic history, treating it as empty");
            TopicHistory::empty(&cfg.topics.history_path)
        }
    };

    let social_topic = match &deps.social {
        Some(s) => topic_from_captions(&s.scraper.recent_captions(&s.username, cfg.social.max_posts).await),
        None => None,
    };
    let topic = match social_topic {
        Some(t) => {
            if let Err(e) = history.append(&t).await {
                warn!(error = %e, "failed to append topic history");
            }
            t
        }
        None => select_topic(deps.generator.as_ref(), &cfg.topics, cfg.llm.topic_sampling, &mut history, rng).await,
    };

    let style = pick_style(rng);
    info!(topic = %topic, style, "writing article");

    let content = generate_article(deps.generator.as_ref(), &cfg.article, cfg.llm.content_sampling, &topic, style).await?;
    let image_url = deps.images.image_url(&cfg.image.query).await;

    let html = render_html(&BlogPost { topic: &topic, image_url: &image_url, content: &content });
    let path = save_post(&cfg.output.out_dir, &cfg.output.file_prefix, chrono::Local::now(), &html)
        .await
        .with_context(|| format!("failed to write post into {}", cfg.output.out_dir.display()))?;

    Ok(RunOutcome { topic, style, image_url, path })
}
