//! SerpAPI-like news-search provider: one query per keyword, run
//! concurrently under the Rate Governor.

use crate::types::{Provider, ProviderErrorEvent, ProviderRunOutcome};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_types::candidate::{ProviderTag, RawCandidate};
use mediascout_types::config::HttpProfile;
use mediascout_types::errors::ScrapeError;
use mediascout_util::effective_tld_plus_one;
use std::sync::Arc;
use std::time::Instant;

pub struct SearchApiProvider {
    http: Arc<HttpClient>,
    governor: Arc<RateGovernor>,
    api_key: String,
    base_url: String,
}

impl SearchApiProvider {
    pub fn new(http: Arc<HttpClient>, governor: Arc<RateGovernor>, api_key: String) -> Self {
        Self {
            http,
            governor,
            api_key,
            base_url: "https://serpapi.example/search".to_string(),
        }
    }

    async fn query_one(&self, keyword: &str, run_id: &str) -> (Vec<RawCandidate>, Option<ProviderErrorEvent>) {
        let domain = effective_tld_plus_one(&self.base_url);
        let permit = match self.governor.acquire(&domain, HttpProfile::Api).await {
            Ok(permit) => permit,
            Err(err) => return (Vec::new(), Some(error_event(self.tag(), run_id, &err))),
        };

        let url = format!(
            "{}?q={}&engine=google_news&api_key={}",
            self.base_url,
            url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect::<String>(),
            self.api_key
        );
        let response = self.http.get(&url, HttpProfile::Api).await;
        drop(permit);

        let body = match response {
            Ok(resp) => resp.body,
            Err(err) => return (Vec::new(), Some(error_event(self.tag(), run_id, &err))),
        };

        match parse_news_results(&body, keyword) {
            Ok(candidates) => (candidates, None),
            Err(message) => (
                Vec::new(),
                Some(ProviderErrorEvent {
                    provider: self.tag(),
                    run_id: run_id.to_string(),
                    error_type: "parse".to_string(),
                    message,
                }),
            ),
        }
    }
}

#[async_trait]
impl Provider for SearchApiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::SearchApi
    }

    async fn scrape(
        &self,
        keywords: &[String],
        _from_date: Option<DateTime<Utc>>,
        _to_date: Option<DateTime<Utc>>,
        run_id: &str,
    ) -> ProviderRunOutcome {
        let started = Instant::now();
        let results = join_all(keywords.iter().map(|kw| self.query_one(kw, run_id))).await;

        let mut outcome = ProviderRunOutcome::default();
        for (candidates, error) in results {
            outcome.candidates.extend(candidates);
            if let Some(error) = error {
                outcome.errors.push(error);
            }
        }
        outcome.duration = started.elapsed();
        outcome
    }
}

/// Parses the `news_results` array, discarding entries missing a link or
/// title.
fn parse_news_results(body: &str, matched_keyword: &str) -> Result<Vec<RawCandidate>, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("invalid serpapi response: {e}"))?;

    let results = value
        .get("news_results")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(results
        .into_iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?.to_string();
            let url = item.get("link")?.as_str()?.to_string();
            let teaser = item
                .get("snippet")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let source_name = item
                .get("source")
                .and_then(|s| s.as_str())
                .unwrap_or("serpapi")
                .to_string();

            let mut candidate = RawCandidate::new(title, teaser, url, source_name, ProviderTag::SearchApi);
            candidate.matched_keyword = Some(matched_keyword.to_string());
            if let Some(date_str) = item.get("date").and_then(|v| v.as_str()) {
                if let Ok((naive, _)) = dtparse::parse(date_str) {
                    candidate.published_at = Some(Utc.from_utc_datetime(&naive));
                    candidate.date_confidence = mediascout_types::candidate::DateConfidence::Medium;
                }
            }
            Some(candidate)
        })
        .collect())
}

fn error_event(provider: ProviderTag, run_id: &str, err: &ScrapeError) -> ProviderErrorEvent {
    ProviderErrorEvent {
        provider,
        run_id: run_id.to_string(),
        error_type: err.error_type_label().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_news_results_and_skips_entries_missing_link() {
        let body = serde_json::json!({
            "news_results": [
                {"title": "A", "link": "https://ex.com/a", "snippet": "s", "source": "Ex"},
                {"title": "No link"}
            ]
        })
        .to_string();
        let candidates = parse_news_results(&body, "netto").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].matched_keyword.as_deref(), Some("netto"));
    }
}
