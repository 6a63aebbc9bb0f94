use rand::{seq::IndexedRandom, Rng};
use tracing::{info, warn};

use crate::config::{Sampling, TopicCfg};
use crate::history::TopicHistory;
use crate::prompts::{TopicPrompt, TOPIC_SYSTEM};
use crate::providers::{CompletionRequest, ProviderError, Task, TextGenerator};
use crate::retry::retry_or_else;

/// Chooses a topic not seen in `history`, falling back to the configured default.
/// The result is always appended to the history file. Never fails.
pub async fn select_topic<R: Rng + ?Sized>(
    generator: &dyn TextGenerator,
    cfg: &TopicCfg,
    sampling: Sampling,
    history: &mut TopicHistory,
    rng: &mut R,
) -> String {
    let topic = match cfg.included_topics.choose(rng) {
        Some(subject) => propose(generator, cfg, sampling, history, subject).await,
        None => {
            warn!("no included topics configured, using default topic");
            cfg.default_topic.clone()
        }
    };

    if let Err(e) = history.append(&topic).await {
        warn!(error = %e, path = %history.path().display(), "failed to append topic history");
    }
    topic
}

async fn propose(
    generator: &dyn TextGenerator,
    cfg: &TopicCfg,
    sampling: Sampling,
    history: &TopicHistory,
    subject: &str,
) -> String {
    let prompt = TopicPrompt { subject, excluded: &cfg.excluded_topics, recent: history.recent(cfg.recent_window) }.render();
    let req = CompletionRequest { task: Task::Topic, system: TOPIC_SYSTEM, user: &prompt, sampling };
    let req = &req;

    let topic = retry_or_else(
        cfg.attempts,
        |attempt| async move {
            let raw = generator.complete(req).await?;
            let candidate = normalize(&raw);
            info!(attempt, candidate = %candidate, "topic proposed");
            Ok::<_, ProviderError>(candidate)
        },
        |candidate| acceptable(candidate, cfg, history),
        || cfg.default_topic.clone(),
    )
    .await;
    info!(topic = %topic, subject, "topic selected");
    topic
}

fn acceptable(candidate: &str, cfg: &TopicCfg, history: &TopicHistory) -> bool {
    let lowered = candidate.to_lowercase();
    !candidate.is_empty()
        && !history.contains(candidate)
        && !cfg.excluded_topics.iter().any(|x| x.trim().to_lowercase() == lowered)
}

/// First non-empty line, trimmed, without wrapping quotes or a "Title:" label.
fn normalize(raw: &str) -> String {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let line = line
        .strip_prefix("Topic:")
        .or_else(|| line.strip_prefix("Title:"))
        .unwrap_or(line)
        .trim();
    line.trim_matches(|c| matches!(c, '"' | '\'' | '*' | '“' | '”')).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;
    use rand::{rngs::StdRng, SeedableRng};
    use std::path::Path;

    fn cfg(history_path: &Path) -> TopicCfg {
        TopicCfg {
            included_topics: vec!["kitchens".into(), "roofing".into()],
            excluded_topics: vec!["Politics".into(), "Crypto Mining".into()],
            default_topic: "Default Topic".into(),
            history_path: history_path.to_path_buf(),
            recent_window: 5,
            attempts: 5,
        }
    }

    fn sampling() -> Sampling {
        Sampling { temperature: 1.0, presence_penalty: 0.0, frequency_penalty: 0.0, max_tokens: Some(40) }
    }

    async fn seeded_history(path: &Path, topics: &[&str]) -> TopicHistory {
        let mut body = topics.join("\n");
        body.push('\n');
        tokio::fs::write(path, body).await.unwrap();
        TopicHistory::load(path).await.unwrap()
    }

    #[tokio::test]
    async fn retries_past_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = seeded_history(&path, &["T1", "T2", "T3", "T4", "T5"]).await;
        let gen = ScriptedGenerator::new(["T3", "T6"]);
        let mut rng = StdRng::seed_from_u64(1);

        let topic = select_topic(&gen, &cfg(&path), sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "T6");
        assert_eq!(gen.calls(), 2);
        assert!(gen.prompts.lock().unwrap()[0].contains("T1; T2; T3; T4; T5"));
        let persisted = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(persisted.ends_with("T5\nT6\n"));
    }

    #[tokio::test]
    async fn entries_older_than_prompt_window_still_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = seeded_history(&path, &["T1", "T2", "T3", "T4", "T5", "T6", "T7"]).await;
        let gen = ScriptedGenerator::new(["T1", "T8"]);
        let mut rng = StdRng::seed_from_u64(6);

        let topic = select_topic(&gen, &cfg(&path), sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "T8");
        assert_eq!(gen.calls(), 2);
        let first_prompt = gen.prompts.lock().unwrap()[0].clone();
        assert!(first_prompt.contains("T3; T4; T5; T6; T7"));
        assert!(!first_prompt.contains("T1"));
    }

    #[tokio::test]
    async fn exclusion_ignores_unicode_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = TopicHistory::load(&path).await.unwrap();
        let mut c = cfg(&path);
        c.excluded_topics = vec!["Énergie Nucléaire".into()];
        let gen = ScriptedGenerator::new(["énergie nucléaire", "Solar Shingles"]);
        let mut rng = StdRng::seed_from_u64(7);

        let topic = select_topic(&gen, &c, sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "Solar Shingles");
    }

    #[tokio::test]
    async fn only_duplicates_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = seeded_history(&path, &["T1", "T2"]).await;
        let gen = ScriptedGenerator::new(["T1", "t2", "T1", "T2", "T1", "never asked"]);
        let mut rng = StdRng::seed_from_u64(2);

        let topic = select_topic(&gen, &cfg(&path), sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "Default Topic");
        assert_eq!(gen.calls(), 5);
        assert_eq!(history.entries().last().map(String::as_str), Some("Default Topic"));
    }

    #[tokio::test]
    async fn excluded_phrases_are_never_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = TopicHistory::load(&path).await.unwrap();
        let gen = ScriptedGenerator::new(["politics", "\"Crypto Mining\"", "Heated Floors Explained"]);
        let mut rng = StdRng::seed_from_u64(3);

        let topic = select_topic(&gen, &cfg(&path), sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "Heated Floors Explained");
    }

    #[tokio::test]
    async fn generator_failure_falls_back_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = TopicHistory::load(&path).await.unwrap();
        let gen = ScriptedGenerator::failing("connection refused");
        let mut rng = StdRng::seed_from_u64(4);

        let topic = select_topic(&gen, &cfg(&path), sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "Default Topic");
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "Default Topic\n");
    }

    #[tokio::test]
    async fn no_included_topics_skips_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let mut history = TopicHistory::load(&path).await.unwrap();
        let mut c = cfg(&path);
        c.included_topics.clear();
        let gen = ScriptedGenerator::new(["unused"]);
        let mut rng = StdRng::seed_from_u64(5);

        let topic = select_topic(&gen, &c, sampling(), &mut history, &mut rng).await;
        assert_eq!(topic, "Default Topic");
        assert_eq!(gen.calls(), 0);
    }

    #[test]
    fn normalize_strips_labels_and_quotes() {
        assert_eq!(normalize("  \"Smart Homes in 2026\"  \nextra"), "Smart Homes in 2026");
        assert_eq!(normalize("\n\nTitle: **Deck Care**"), "Deck Care");
        assert_eq!(normalize("   "), "");
    }
}
