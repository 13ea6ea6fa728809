// File: ./src/summarize.rs
//! Digest summarization through an OpenAI-compatible chat completions endpoint.
use crate::config::OpenAiConfig;
use crate::digest::Digest;
use crate::error::{Result, StatuslyError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "You are an assistant that writes a developer's status update. \
The user message lists work items grouped under DOING, DONE and BLOCKER. \
Produce exactly three markdown sections titled DOING, DONE and BLOCKER. \
Merge items that describe the same piece of work into a single bullet. \
Ignore anything that does not belong to one of those three categories. \
Keep bullets short and factual.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, digest: &Digest) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiSummarizer {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiSummarizer {
    pub fn new(config: OpenAiConfig, timeout: Duration) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StatuslyError::MissingCredentials("OpenAI API key is not set"));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatuslyError::SummarizationFailed(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, digest: &Digest) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": digest.as_str() },
            ],
        });

        log::debug!("Requesting summary from {} ({})", url, self.config.model);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StatuslyError::SummarizationFailed(format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(StatuslyError::SummarizationFailed(format!(
                "API error {}: {}",
                status, text
            )));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            StatuslyError::SummarizationFailed(format!("malformed response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| StatuslyError::SummarizationFailed("response had no choices".into()))
    }
}
