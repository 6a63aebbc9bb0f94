//! Caption scraping from a public profile page.
//!
//! Deprecated: this reads an undocumented data block embedded in the page and
//! breaks whenever the site changes its markup. Only the handful of fields we
//! need are parsed, and anything that does not match is rejected.

use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{info, warn};

const SHARED_DATA_MARKER: &str = "window._sharedData";

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("profile page returned {0}")]
    Status(reqwest::StatusCode),
    #[error("no embedded profile data found")]
    MissingData,
    #[error("embedded profile data did not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("profile page held no profile entry")]
    NoProfile,
}

#[derive(Deserialize)] struct SharedData { entry_data: EntryData }
#[derive(Deserialize)] struct EntryData { #[serde(rename = "ProfilePage")] profile_page: Vec<ProfilePage> }
#[derive(Deserialize)] struct ProfilePage { graphql: Graphql }
#[derive(Deserialize)] struct Graphql { user: User }
#[derive(Deserialize)] struct User { edge_owner_to_timeline_media: Edges<Post> }
#[derive(Deserialize)] struct Edges<T> { edges: Vec<Edge<T>> }
#[derive(Deserialize)] struct Edge<T> { node: T }
#[derive(Deserialize)] struct Post { edge_media_to_caption: Edges<Caption> }
#[derive(Deserialize)] struct Caption { text: String }

/// Captions of the newest `limit` posts, skipping posts without one.
pub fn extract_captions(html: &str, limit: usize) -> Result<Vec<String>, ScrapeError> {
    let doc = Html::parse_document(html);
    let scripts = Selector::parse("script").map_err(|_| ScrapeError::MissingData)?;
    let script = doc
        .select(&scripts)
        .map(|el| el.text().collect::<String>())
        .find(|t| t.contains(SHARED_DATA_MARKER))
        .ok_or(ScrapeError::MissingData)?;

    let json = script
        .split_once(" = ")
        .map(|(_, rhs)| rhs.trim().trim_end_matches(';'))
        .ok_or(ScrapeError::MissingData)?;
    let data: SharedData = serde_json::from_str(json)?;

    let page = data.entry_data.profile_page.into_iter().next().ok_or(ScrapeError::NoProfile)?;
    Ok(page
        .graphql
        .user
        .edge_owner_to_timeline_media
        .edges
        .into_iter()
        .take(limit)
        .filter_map(|post| post.node.edge_media_to_caption.edges.into_iter().next())
        .map(|c| c.node.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

pub struct ProfileScraper { client: reqwest::Client, base_url: String }

impl ProfileScraper {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base_url }
    }

    async fn try_captions(&self, username: &str, limit: usize) -> Result<Vec<String>, ScrapeError> {
        let resp = self.client.get(format!("{}/{}/", self.base_url, username)).send().await?;
        if !resp.status().is_success() {
            return Err(ScrapeError::Status(resp.status()));
        }
        let body = resp.text().await?;
        extract_captions(&body, limit)
    }

    /// Best effort: every failure is logged and yields no captions.
    pub async fn recent_captions(&self, username: &str, limit: usize) -> Vec<String> {
        warn!("social scraping is deprecated and may stop working without notice");
        match self.try_captions(username, limit).await {
            Ok(captions) => {
                info!(username, count = captions.len(), "captions scraped");
                captions
            }
            Err(e) => {
                warn!(error = %e, username, "caption scrape failed");
                Vec::new()
            }
        }
    }
}

pub fn topic_from_captions(captions: &[String]) -> Option<String> {
    captions.first().map(|c| format!("Trending blog topic based on Instagram posts: {c}"))
}
