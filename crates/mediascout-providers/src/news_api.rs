//! GNews-like news-search API provider: OR-joined keyword batches, page
//! cursoring, `lang`/region honored.

use crate::types::{Provider, ProviderErrorEvent, ProviderRunOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_types::candidate::{ProviderTag, RawCandidate};
use mediascout_types::config::HttpProfile;
use mediascout_types::errors::ScrapeError;
use mediascout_util::effective_tld_plus_one;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

const MAX_QUERY_CHARS: usize = 400;
const MAX_PAGES: usize = 3;
const PAGE_SIZE: usize = 25;

pub struct NewsApiProvider {
    http: Arc<HttpClient>,
    governor: Arc<RateGovernor>,
    api_key: String,
    base_url: String,
    lang: String,
    country: String,
}

impl NewsApiProvider {
    pub fn new(http: Arc<HttpClient>, governor: Arc<RateGovernor>, api_key: String) -> Self {
        Self {
            http,
            governor,
            api_key,
            base_url: "https://gnews.example/v4/search".to_string(),
            lang: "en".to_string(),
            country: "us".to_string(),
        }
    }
}

/// Groups keywords into OR-joined batches, each at most `MAX_QUERY_CHARS`
/// long, so a single request string never exceeds the upstream API's cap.
fn batch_keywords(keywords: &[String]) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();

    for keyword in keywords {
        let candidate = if current.is_empty() {
            keyword.clone()
        } else {
            format!("{current} OR {keyword}")
        };
        if candidate.len() > MAX_QUERY_CHARS && !current.is_empty() {
            batches.push(current);
            current = keyword.clone();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[async_trait]
impl Provider for NewsApiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::NewsApi
    }

    async fn scrape(
        &self,
        keywords: &[String],
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        run_id: &str,
    ) -> ProviderRunOutcome {
        let started = Instant::now();
        let mut outcome = ProviderRunOutcome::default();
        let domain = effective_tld_plus_one(&self.base_url);

        for batch in batch_keywords(keywords) {
            'pages: for page in 1..=MAX_PAGES {
                let permit = match self.governor.acquire(&domain, HttpProfile::Api).await {
                    Ok(permit) => permit,
                    Err(err) => {
                        outcome.errors.push(error_event(self.tag(), run_id, &err));
                        break 'pages;
                    }
                };

                let url = build_url(&self.base_url, &batch, &self.lang, &self.country, page, &self.api_key, from_date, to_date);
                let response = self.http.get(&url, HttpProfile::Api).await;
                drop(permit);

                let body = match response {
                    Ok(resp) => resp.body,
                    Err(err) => {
                        warn!(provider = "gnews", run_id, error = %err, "news-api request failed");
                        outcome.errors.push(error_event(self.tag(), run_id, &err));
                        break 'pages;
                    }
                };

                let articles = match parse_articles(&body) {
                    Ok(articles) => articles,
                    Err(message) => {
                        outcome.errors.push(ProviderErrorEvent {
                            provider: self.tag(),
                            run_id: run_id.to_string(),
                            error_type: "parse".to_string(),
                            message,
                        });
                        break 'pages;
                    }
                };

                let fetched = articles.len();
                outcome.candidates.extend(articles);
                if fetched < PAGE_SIZE {
                    break 'pages;
                }
            }
        }

        outcome.duration = started.elapsed();
        outcome
    }
}

fn build_url(
    base: &str,
    query: &str,
    lang: &str,
    country: &str,
    page: usize,
    api_key: &str,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
) -> String {
    let mut url = format!(
        "{base}?q={}&lang={lang}&country={country}&page={page}&token={api_key}",
        urlencode(query)
    );
    if let Some(from) = from_date {
        url.push_str(&format!("&from={}", from.to_rfc3339()));
    }
    if let Some(to) = to_date {
        url.push_str(&format!("&to={}", to.to_rfc3339()));
    }
    url
}

fn urlencode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn parse_articles(body: &str) -> Result<Vec<RawCandidate>, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("invalid gnews response: {e}"))?;

    let articles = value
        .get("articles")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(articles
        .into_iter()
        .filter_map(|article| {
            let title = article.get("title")?.as_str()?.to_string();
            let url = article.get("url")?.as_str()?.to_string();
            let teaser = article
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let source_name = article
                .get("source")
                .and_then(|s| s.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("gnews")
                .to_string();

            let mut candidate = RawCandidate::new(title, teaser, url, source_name, ProviderTag::NewsApi);
            if let Some(published) = article.get("publishedAt").and_then(|v| v.as_str()) {
                if let Ok(dt) = DateTime::parse_from_rfc3339(published) {
                    candidate.published_at = Some(dt.with_timezone(&Utc));
                    candidate.date_confidence = mediascout_types::candidate::DateConfidence::High;
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
    fn batches_keywords_under_the_char_cap() {
        let keywords: Vec<String> = (0..50).map(|i| format!("keyword{i}")).collect();
        let batches = batch_keywords(&keywords);
        assert!(batches.iter().all(|b| b.len() <= MAX_QUERY_CHARS));
        assert!(batches.len() > 1);
    }

    #[test]
    fn single_short_keyword_is_one_batch() {
        let batches = batch_keywords(&["netto".to_string()]);
        assert_eq!(batches, vec!["netto".to_string()]);
    }

    #[test]
    fn parses_articles_and_skips_malformed_entries() {
        let body = serde_json::json!({
            "articles": [
                {"title": "A", "url": "https://ex.com/a", "description": "teaser", "source": {"name": "Ex"}},
                {"title": "No URL"}
            ]
        })
        .to_string();
        let candidates = parse_articles(&body).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "A");
    }
}
