// File: ./src/activity.rs
//! Pull-request activity from the GitHub search API.
//!
//! Two searches per window:
//! - `author:<user> type:pr created:<range>`: PRs opened, classified as *doing*.
//! - `commenter:<user> type:pr updated:<range>`: PRs reviewed or discussed,
//!   classified as *done*.
//!
//! Only the first page (`per_page=100`) is read. Pagination via the `Link`
//! header is the place to extend this if volumes ever exceed one page.
use crate::config::GitHubConfig;
use crate::error::{Result, StatuslyError};
use crate::model::{ActivityItem, DateWindow, FetchedActivity};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PER_PAGE: &str = "100";

/// Source of externally observed activity for a window.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch(&self, window: &DateWindow) -> Result<FetchedActivity>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    html_url: String,
}

pub struct GitHubActivity {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubActivity {
    pub fn new(config: GitHubConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statusly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatuslyError::ExternalFetchFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Fails with `MissingCredentials` when user or token is blank.
    pub fn check_credentials(&self) -> Result<()> {
        if self.config.user.trim().is_empty() {
            return Err(StatuslyError::MissingCredentials("GitHub user is not set"));
        }
        if self.config.token.trim().is_empty() {
            return Err(StatuslyError::MissingCredentials("GitHub token is not set"));
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        let url = format!("{}/search/issues", self.config.api_url.trim_end_matches('/'));
        log::debug!("GitHub search: {}", query);

        let resp = self
            .client
            .get(&url)
            .query(&[("q", query), ("per_page", PER_PAGE)])
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| StatuslyError::ExternalFetchFailed(format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(StatuslyError::ExternalFetchFailed(format!(
                "GitHub API error {}: {}",
                status, text
            )));
        }

        let body: SearchResponse = resp.json().await.map_err(|e| {
            StatuslyError::ExternalFetchFailed(format!("malformed search response: {}", e))
        })?;
        Ok(body.items)
    }
}

#[async_trait]
impl ActivitySource for GitHubActivity {
    async fn fetch(&self, window: &DateWindow) -> Result<FetchedActivity> {
        self.check_credentials()?;
        let range = window.query_range();
        let user = self.config.user.trim();

        let opened = self
            .search(&format!("author:{} type:pr created:{}", user, range))
            .await?;
        let reviewed = self
            .search(&format!("commenter:{} type:pr updated:{}", user, range))
            .await?;

        log::info!(
            "GitHub activity {}: {} opened, {} reviewed",
            range,
            opened.len(),
            reviewed.len()
        );

        Ok(FetchedActivity {
            doing: opened
                .iter()
                .map(|i| ActivityItem::opened(&i.title, &i.html_url))
                .collect(),
            done: reviewed
                .iter()
                .map(|i| ActivityItem::reviewed(&i.title, &i.html_url))
                .collect(),
        })
    }
}
