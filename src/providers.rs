use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Sampling;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited,
    #[error("http error: {0}")]
    Http(String),
    #[error("fatal provider error: {0}")]
    Fatal(String),
}

/// What a completion is for. Lets offline generators answer sensibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task { Topic, Article }

#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub task: Task,
    pub system: &'a str,
    pub user: &'a str,
    pub sampling: Sampling,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, ProviderError>;
    fn name(&self) -> &'static str;
}

pub struct OpenAIChat { client: reqwest::Client, base_url: String, api_key: String, model: String }

impl OpenAIChat {
    pub fn new(base_url: impl Into<String>, api_key: String, model: String) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base_url, api_key, model }
    }
}

#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}
#[derive(Serialize)] struct Msg<'a> { role: &'a str, content: &'a str }
#[derive(Deserialize)] struct ChatResp { choices: Vec<Choice> }
#[derive(Deserialize)] struct Choice { message: MsgOwned }
#[derive(Deserialize)] struct MsgOwned { content: Option<String> }

#[async_trait]
impl TextGenerator for OpenAIChat {
    async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        let body = ChatReq {
            model: &self.model,
            messages: vec![
                Msg { role: "system", content: req.system },
                Msg { role: "user", content: req.user },
            ],
            temperature: req.sampling.temperature,
            presence_penalty: req.sampling.presence_penalty,
            frequency_penalty: req.sampling.frequency_penalty,
            max_tokens: req.sampling.max_tokens,
        };
        let resp = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Http(format!("{status}: {text}")));
        }

        let parsed: ChatResp = resp
            .json()
            .await
            .map_err(|e| ProviderError::Fatal(format!("malformed completion body: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::Fatal("completion had no content".into()))
    }

    fn name(&self) -> &'static str { "openai" }
}

/// Offline generator for dry runs. Never touches the network.
pub struct MockGenerator;

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        Ok(match req.task {
            Task::Topic => format!("Offline draft topic {}", chrono::Local::now().format("%Y%m%d%H%M%S")),
            Task::Article => format!(
                "This article was generated offline without contacting a language model.\n\
                 It stands in for real content so the rest of the pipeline can be checked.\n\
                 Prompt used:\n{}",
                req.user
            ),
        })
    }

    fn name(&self) -> &'static str { "mock" }
}
