use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "blogen.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicCfg {
    pub included_topics: Vec<String>,
    pub excluded_topics: Vec<String>,
    pub default_topic: String,
    pub history_path: PathBuf,
    /// How many of the most recent topics are shown to the model.
    pub recent_window: usize,
    pub attempts: u32,
}

impl Default for TopicCfg {
    fn default() -> Self {
        Self {
            included_topics: vec![
                "residential construction".into(),
                "commercial building design".into(),
                "home renovation and remodeling".into(),
                "sustainable building materials".into(),
                "construction project management".into(),
                "architecture and interior design trends".into(),
            ],
            excluded_topics: vec![
                "politics".into(),
                "cryptocurrency".into(),
                "celebrity gossip".into(),
            ],
            default_topic: "Design, Build, and Construction: Best Practices and Trends".into(),
            history_path: PathBuf::from("topic_history.txt"),
            recent_window: 5,
            attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    #[serde(default)]
    pub presence_penalty: f32,
    #[serde(default)]
    pub frequency_penalty: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind { OpenAI, Mock }

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "mock" => Ok(Self::Mock),
            other => bail!("unknown provider {other:?} (expected openai|mock)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmCfg {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub topic_sampling: Sampling,
    pub content_sampling: Sampling,
}

impl Default for LlmCfg {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: "gpt-4".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            topic_sampling: Sampling { temperature: 1.0, presence_penalty: 0.0, frequency_penalty: 0.0, max_tokens: Some(40) },
            content_sampling: Sampling { temperature: 0.7, presence_penalty: 0.6, frequency_penalty: 0.6, max_tokens: None },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCfg {
    pub base_url: String,
    pub access_key_env: String,
    pub query: String,
}

impl Default for ImageCfg {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".into(),
            access_key_env: "UNSPLASH_ACCESS_KEY".into(),
            query: "construction".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialCfg {
    pub enabled: bool,
    pub base_url: String,
    pub username_env: String,
    pub max_posts: usize,
}

impl Default for SocialCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://www.instagram.com".into(),
            username_env: "INSTAGRAM_USERNAME".into(),
            max_posts: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputCfg { pub out_dir: PathBuf, pub file_prefix: String }

impl Default for OutputCfg {
    fn default() -> Self { Self { out_dir: PathBuf::from("."), file_prefix: "blog_".into() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleCfg { pub words: u32, pub business_contact_block: String }

impl Default for ArticleCfg {
    fn default() -> Self {
        Self {
            words: 1000,
            business_contact_block: "Planning a build or renovation? Contact our design and construction team \
                for a free consultation and let us help you bring your project to life."
                .into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub topics: TopicCfg,
    pub llm: LlmCfg,
    pub image: ImageCfg,
    pub social: SocialCfg,
    pub output: OutputCfg,
    pub article: ArticleCfg,
}

impl Config {
    /// Reads `path` if given, otherwise `blogen.yaml` when it exists, otherwise defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        let txt = match tokio::fs::read_to_string(&path).await {
            Ok(t) => t,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read config file: {}", path.display())),
        };
        Self::from_yaml(&txt).with_context(|| format!("failed to parse config YAML: {}", path.display()))
    }

    pub fn from_yaml(txt: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(txt)?)
    }

    /// `BLOGEN_*` overrides, applied on top of the file.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|k| std::env::var(k).ok())
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = get("BLOGEN_OUT_DIR") { self.output.out_dir = dir.into(); }
        if let Some(p) = get("BLOGEN_HISTORY") { self.topics.history_path = p.into(); }
        if let Some(m) = get("BLOGEN_MODEL") { self.llm.model = m; }
        if let Some(p) = get("BLOGEN_PROVIDER") { self.llm.provider = p.parse()?; }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.topics.attempts == 0 {
            bail!("topics.attempts must be greater than 0");
        }
        if self.topics.default_topic.trim().is_empty() {
            bail!("topics.default_topic cannot be empty");
        }
        if self.output.file_prefix.is_empty() {
            bail!("output.file_prefix cannot be empty");
        }
        Ok(())
    }
}
