use async_trait::async_trait;
use std::{collections::VecDeque, sync::Mutex};

use crate::providers::{CompletionRequest, ProviderError, TextGenerator};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

/// Replays canned replies in order; errors once the script runs out.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|s| Ok(s.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self { replies: Mutex::new(VecDeque::from([Err(msg.to_string())])), prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(req.user.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(s)) => Ok(s),
            Some(Err(e)) => Err(ProviderError::Http(e)),
            None => Err(ProviderError::Fatal("script exhausted".into())),
        }
    }

    fn name(&self) -> &'static str { "scripted" }
}
