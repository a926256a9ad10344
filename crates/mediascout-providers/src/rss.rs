//! RSS/Atom feed provider: `ETag`-cached fetches, within-feed dedup, and
//! per-feed parse-failure ("bozo") tracking as a source-quality signal.

use crate::types::{Provider, ProviderErrorEvent, ProviderRunOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_types::candidate::{DateConfidence, ProviderTag, RawCandidate};
use mediascout_types::config::HttpProfile;
use mediascout_util::effective_tld_plus_one;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

pub struct RssProvider {
    http: Arc<HttpClient>,
    governor: Arc<RateGovernor>,
    feed_urls: Vec<String>,
    etags: DashMap<String, String>,
    /// Consecutive parse failures per feed, the closest equivalent to a
    /// `feedparser`-style bozo flag: a rising count signals a feed worth
    /// dropping from the seed list.
    bozo_counts: DashMap<String, u32>,
}

impl RssProvider {
    pub fn new(http: Arc<HttpClient>, governor: Arc<RateGovernor>, feed_urls: Vec<String>) -> Self {
        Self {
            http,
            governor,
            feed_urls,
            etags: DashMap::new(),
            bozo_counts: DashMap::new(),
        }
    }

    pub fn bozo_count(&self, feed_url: &str) -> u32 {
        self.bozo_counts.get(feed_url).map(|c| *c).unwrap_or(0)
    }

    async fn fetch_feed(&self, feed_url: &str, run_id: &str) -> (Vec<RawCandidate>, Option<ProviderErrorEvent>) {
        let domain = effective_tld_plus_one(feed_url);
        let permit = match self.governor.acquire(&domain, HttpProfile::Rss).await {
            Ok(permit) => permit,
            Err(err) => {
                return (
                    Vec::new(),
                    Some(ProviderErrorEvent {
                        provider: ProviderTag::Rss,
                        run_id: run_id.to_string(),
                        error_type: err.error_type_label().to_string(),
                        message: err.to_string(),
                    }),
                )
            }
        };

        let etag = self.etags.get(feed_url).map(|e| e.clone());
        let response = self
            .http
            .get_conditional(feed_url, HttpProfile::Rss, etag.as_deref())
            .await;
        drop(permit);

        let response = match response {
            Ok(resp) => resp,
            Err(err) => {
                return (
                    Vec::new(),
                    Some(ProviderErrorEvent {
                        provider: ProviderTag::Rss,
                        run_id: run_id.to_string(),
                        error_type: err.error_type_label().to_string(),
                        message: err.to_string(),
                    }),
                )
            }
        };

        if response.status == 304 {
            return (Vec::new(), None);
        }

        if let Some(etag) = &response.etag {
            self.etags.insert(feed_url.to_string(), etag.clone());
        }

        match feed_rs::parser::parse(response.body.as_bytes()) {
            Ok(feed) => {
                self.bozo_counts.remove(feed_url);
                (dedup_entries(feed.entries, feed_url), None)
            }
            Err(err) => {
                self.bozo_counts
                    .entry(feed_url.to_string())
                    .and_modify(|c| *c += 1)
                    .or_insert(1);
                warn!(feed_url, error = %err, "feed parse failed (bozo)");
                (
                    Vec::new(),
                    Some(ProviderErrorEvent {
                        provider: ProviderTag::Rss,
                        run_id: run_id.to_string(),
                        error_type: "parse".to_string(),
                        message: err.to_string(),
                    }),
                )
            }
        }
    }
}

/// Dedup within a single feed by `(guid OR link, normalized title)`, first
/// occurrence wins.
fn dedup_entries(entries: Vec<feed_rs::model::Entry>, source_name: &str) -> Vec<RawCandidate> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out = Vec::new();

    for entry in entries {
        let link = entry.links.first().map(|l| l.href.clone());
        let Some(link) = link else { continue };
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let identity = entry.id.clone();
        let key = (
            if identity.is_empty() { link.clone() } else { identity },
            title.to_lowercase(),
        );
        if !seen.insert(key) {
            continue;
        }

        let teaser = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .unwrap_or_default();

        let mut candidate = RawCandidate::new(title, teaser, link, source_name, ProviderTag::Rss);
        let published: Option<DateTime<Utc>> = entry.published.or(entry.updated);
        if let Some(published) = published {
            candidate.published_at = Some(published);
            candidate.date_confidence = DateConfidence::High;
        }
        out.push(candidate);
    }
    out
}

#[async_trait]
impl Provider for RssProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Rss
    }

    async fn scrape(
        &self,
        _keywords: &[String],
        _from_date: Option<DateTime<Utc>>,
        _to_date: Option<DateTime<Utc>>,
        run_id: &str,
    ) -> ProviderRunOutcome {
        let started = Instant::now();
        let mut outcome = ProviderRunOutcome::default();

        for feed_url in &self.feed_urls {
            let (candidates, error) = self.fetch_feed(feed_url, run_id).await;
            outcome.candidates.extend(candidates);
            if let Some(error) = error {
                outcome.errors.push(error);
            }
        }

        outcome.duration = started.elapsed();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_rs::model::{Entry, Link, Text};

    fn entry(id: &str, link: &str, title: &str) -> Entry {
        let mut entry = Entry::default();
        entry.id = id.to_string();
        entry.links = vec![Link {
            href: link.to_string(),
            rel: None,
            media_type: None,
            href_lang: None,
            title: None,
            length: None,
        }];
        entry.title = Some(Text {
            content_type: mime::TEXT_PLAIN,
            src: None,
            content: title.to_string(),
        });
        entry
    }

    #[test]
    fn dedups_entries_sharing_a_guid() {
        let entries = vec![
            entry("guid-1", "https://ex.com/a", "Title A"),
            entry("guid-1", "https://ex.com/a", "Title A"),
            entry("guid-2", "https://ex.com/b", "Title B"),
        ];
        let out = dedup_entries(entries, "Example Feed");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn entries_without_a_link_are_dropped() {
        let mut no_link = Entry::default();
        no_link.title = Some(Text {
            content_type: mime::TEXT_PLAIN,
            src: None,
            content: "No link".to_string(),
        });
        let out = dedup_entries(vec![no_link], "Example Feed");
        assert!(out.is_empty());
    }
}
