use anyhow::{Context, Result};
use chrono::Datelike;
use tracing::info;

use crate::config::{ArticleCfg, Sampling};
use crate::prompts::{ArticlePrompt, ARTICLE_SYSTEM};
use crate::providers::{CompletionRequest, Task, TextGenerator};

/// Asks the model for the article body. No retry; any failure aborts the run.
pub async fn generate_article(
    generator: &dyn TextGenerator,
    cfg: &ArticleCfg,
    sampling: Sampling,
    topic: &str,
    style: &str,
) -> Result<String> {
    let prompt = ArticlePrompt {
        topic,
        style,
        words: cfg.words,
        year: chrono::Local::now().year(),
        contact_block: &cfg.business_contact_block,
    }
    .render();
    let req = CompletionRequest { task: Task::Article, system: ARTICLE_SYSTEM, user: &prompt, sampling };

    let text = generator
        .complete(&req)
        .await
        .with_context(|| format!("content generation failed ({})", generator.name()))?;
    let text = text.trim().to_string();
    anyhow::ensure!(!text.is_empty(), "content generation returned empty text");
    info!(chars = text.len(), provider = generator.name(), "article generated");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;

    fn sampling() -> Sampling {
        Sampling { temperature: 0.7, presence_penalty: 0.6, frequency_penalty: 0.6, max_tokens: None }
    }

    #[tokio::test]
    async fn returns_trimmed_text_and_sends_contact_block() {
        let cfg = ArticleCfg { words: 1000, business_contact_block: "Call ACME Builders.".into() };
        let gen = ScriptedGenerator::new(["\n\n  Body text.\nMore.  \n"]);
        let out = generate_article(&gen, &cfg, sampling(), "Decks", "Be brief.").await.unwrap();
        assert_eq!(out, "Body text.\nMore.");
        let prompt = gen.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Decks"));
        assert!(prompt.contains("Be brief."));
        assert!(prompt.contains("Call ACME Builders."));
        assert!(prompt.contains(&chrono::Local::now().year().to_string()));
    }

    #[tokio::test]
    async fn failure_propagates() {
        let gen = ScriptedGenerator::failing("401 unauthorized");
        let err = generate_article(&gen, &ArticleCfg::default(), sampling(), "Decks", "x").await.unwrap_err();
        assert!(format!("{err:#}").contains("401 unauthorized"));
    }

    #[tokio::test]
    async fn whitespace_only_is_an_error() {
        let gen = ScriptedGenerator::new(["   \n "]);
        assert!(generate_article(&gen, &ArticleCfg::default(), sampling(), "Decks", "x").await.is_err());
    }
}
