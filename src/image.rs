use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{info, warn};

use crate::providers::ProviderError;

/// Finds an illustrative image. An empty string means "no image" and is never an error.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn image_url(&self, query: &str) -> String;
    fn name(&self) -> &'static str;
}

pub struct NoImage;

#[async_trait]
impl ImageSource for NoImage {
    async fn image_url(&self, _query: &str) -> String { String::new() }
    fn name(&self) -> &'static str { "none" }
}

pub struct Unsplash { client: reqwest::Client, base_url: String, access_key: String }

#[derive(Deserialize)] struct RandomPhoto { urls: PhotoUrls }
#[derive(Deserialize)] struct PhotoUrls { regular: Option<String> }

impl Unsplash {
    pub fn new(base_url: impl Into<String>, access_key: String) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base_url, access_key }
    }

    /// `query` spaces become `+` through form encoding.
    fn request_url(&self, query: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/photos/random", self.base_url))
            .map_err(|e| ProviderError::Fatal(format!("bad image base url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("query", query.trim())
            .append_pair("client_id", &self.access_key);
        Ok(url)
    }

    async fn try_fetch(&self, query: &str) -> Result<String, ProviderError> {
        let resp = self.client
            .get(self.request_url(query)?)
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Http(status.to_string()));
        }
        let photo: RandomPhoto = resp
            .json()
            .await
            .map_err(|e| ProviderError::Fatal(format!("malformed photo body: {e}")))?;
        Ok(photo.urls.regular.unwrap_or_default())
    }
}

#[async_trait]
impl ImageSource for Unsplash {
    async fn image_url(&self, query: &str) -> String {
        match self.try_fetch(query).await {
            Ok(url) => {
                info!(query, found = !url.is_empty(), "image lookup finished");
                url
            }
            Err(e) => {
                warn!(error = %e, query, "image lookup failed, continuing without image");
                String::new()
            }
        }
    }

    fn name(&self) -> &'static str { "unsplash" }
}
