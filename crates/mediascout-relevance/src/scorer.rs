//! Scorer implementations: a real HTTP-backed LLM call, and a no-op
//! scorer for when no credential is configured — both paths converge on
//! the filter's fail-open guarantee.

use crate::types::{Decision, RelevanceInput, MAX_OUTPUT_TOKENS};
use async_trait::async_trait;
use mediascout_types::errors::ScrapeError;
use std::time::Duration;

#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, input: &RelevanceInput) -> Result<Decision, ScrapeError>;
}

/// Always keeps. Used when `SCRAPING_RELEVANCE_API_KEY` is unset — missing
/// credential is itself a fail-open condition, not a startup error.
pub struct NullScorer;

#[async_trait]
impl RelevanceScorer for NullScorer {
    async fn score(&self, _input: &RelevanceInput) -> Result<Decision, ScrapeError> {
        Ok(Decision::Keep)
    }
}

/// Calls a chat-completions-compatible endpoint with a tight token budget
/// and a short timeout; any failure is surfaced as an `Err` for the
/// caller's fail-open handling, never silently retried.
pub struct HttpScorer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpScorer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl RelevanceScorer for HttpScorer {
    async fn score(&self, input: &RelevanceInput) -> Result<Decision, ScrapeError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": 0.0,
            "messages": [
                {"role": "system", "content": "Reply with exactly one word: keep or drop."},
                {"role": "user", "content": input.render_prompt()},
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::Timeout {
                        operation: "relevance scoring".to_string(),
                    }
                } else {
                    ScrapeError::TransportError {
                        url: self.endpoint.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(ScrapeError::HttpError {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let value: serde_json::Value = response.json().await.map_err(|e| ScrapeError::ParseError {
            message: format!("relevance scorer response: {e}"),
        })?;

        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScrapeError::ParseError {
                message: "relevance scorer response missing choices[0].message.content".to_string(),
            })?;

        match content.trim().to_lowercase().as_str() {
            answer if answer.starts_with("drop") => Ok(Decision::Drop),
            _ => Ok(Decision::Keep),
        }
    }
}
