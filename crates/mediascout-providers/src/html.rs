//! Configurable HTML provider: per-recipe discovery (site-search, sitemap,
//! or RSS) followed by extraction via [`mediascout_extract::Extractor`]
//! and a keyword-match gate.

use crate::types::{Provider, ProviderErrorEvent, ProviderRunOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediascout_extract::Extractor;
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_types::candidate::{ProviderTag, RawCandidate};
use mediascout_types::config::HttpProfile;
use mediascout_types::model::{DiscoveryType, SourceRecipe};
use mediascout_util::{contains_word, effective_tld_plus_one};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

const CATEGORY_MARKERS: &[&str] = &["category", "categories", "tag", "tags", "page", "author", "search"];

pub struct ConfigurableHtmlProvider {
    http: Arc<HttpClient>,
    governor: Arc<RateGovernor>,
    extractor: Extractor,
    recipes: Vec<SourceRecipe>,
}

impl ConfigurableHtmlProvider {
    pub fn new(http: Arc<HttpClient>, governor: Arc<RateGovernor>, recipes: Vec<SourceRecipe>) -> Self {
        Self {
            http,
            governor,
            extractor: Extractor::new(),
            recipes,
        }
    }

    async fn discover(&self, recipe: &SourceRecipe, keyword: &str) -> Vec<String> {
        match recipe.discovery_type {
            DiscoveryType::SiteSearch if recipe.search_url_pattern.contains("{keyword}") => {
                let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
                let search_url = recipe.search_url_pattern.replace("{keyword}", &encoded);
                self.fetch_and_extract_links(&search_url).await
            }
            DiscoveryType::Sitemap => match &recipe.sitemap_url {
                Some(sitemap_url) => self.fetch_sitemap_links(sitemap_url).await,
                None => Vec::new(),
            },
            DiscoveryType::Rss => {
                let mut links = Vec::new();
                for feed_url in &recipe.rss_urls {
                    links.extend(self.fetch_feed_links(feed_url).await);
                }
                links
            }
            _ => Vec::new(),
        }
    }

    async fn fetch_and_extract_links(&self, url: &str) -> Vec<String> {
        let Some(body) = self.get(url, HttpProfile::Html).await else {
            return Vec::new();
        };
        let document = Html::parse_document(&body);
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve_url(url, href))
            .filter(|link| looks_article_like(link))
            .collect()
    }

    async fn fetch_sitemap_links(&self, sitemap_url: &str) -> Vec<String> {
        let Some(body) = self.get(sitemap_url, HttpProfile::Html).await else {
            return Vec::new();
        };
        extract_loc_entries(&body)
    }

    async fn fetch_feed_links(&self, feed_url: &str) -> Vec<String> {
        let Some(body) = self.get(feed_url, HttpProfile::Rss).await else {
            return Vec::new();
        };
        match feed_rs::parser::parse(body.as_bytes()) {
            Ok(feed) => feed
                .entries
                .into_iter()
                .filter_map(|e| e.links.first().map(|l| l.href.clone()))
                .collect(),
            Err(err) => {
                warn!(feed_url, error = %err, "configurable-html rss discovery parse failed");
                Vec::new()
            }
        }
    }

    async fn get(&self, url: &str, profile: HttpProfile) -> Option<String> {
        let domain = effective_tld_plus_one(url);
        let _permit = self.governor.acquire(&domain, profile).await.ok()?;
        self.http.get(url, profile).await.ok().map(|r| r.body)
    }
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    let base = url::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Heuristic: at least two path segments, and none of them looks like a
/// category/listing marker.
fn looks_article_like(link: &str) -> bool {
    let Ok(parsed) = url::Url::parse(link) else { return false };
    let segments: Vec<String> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(|s| s.to_lowercase()).collect())
        .unwrap_or_default();
    segments.len() >= 2 && !segments.iter().any(|s| CATEGORY_MARKERS.contains(&s.as_str()))
}

fn extract_loc_entries(xml: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<loc>") {
        let after = &rest[start + "<loc>".len()..];
        let Some(end) = after.find("</loc>") else { break };
        urls.push(after[..end].trim().to_string());
        rest = &after[end + "</loc>".len()..];
    }
    urls
}

#[async_trait]
impl Provider for ConfigurableHtmlProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::ConfigurableHtml
    }

    async fn scrape(
        &self,
        keywords: &[String],
        _from_date: Option<DateTime<Utc>>,
        _to_date: Option<DateTime<Utc>>,
        run_id: &str,
    ) -> ProviderRunOutcome {
        let started = Instant::now();
        let mut outcome = ProviderRunOutcome::default();

        for recipe in &self.recipes {
            for keyword in keywords {
                let urls = self.discover(recipe, keyword).await;
                for article_url in urls {
                    let body = match self.get(&article_url, HttpProfile::Html).await {
                        Some(body) => body,
                        None => continue,
                    };

                    let extracted = match self.extractor.extract(&body, Some(recipe), &article_url) {
                        Ok(extracted) => extracted,
                        Err(err) => {
                            outcome.errors.push(ProviderErrorEvent {
                                provider: self.tag(),
                                run_id: run_id.to_string(),
                                error_type: err.error_type_label().to_string(),
                                message: err.to_string(),
                            });
                            continue;
                        }
                    };

                    let haystack = format!("{} {}", extracted.title, extracted.content_teaser);
                    if !contains_word(&haystack, keyword) {
                        continue;
                    }

                    let mut candidate = RawCandidate::new(
                        extracted.title,
                        extracted.content_teaser,
                        article_url,
                        recipe.domain.clone(),
                        ProviderTag::ConfigurableHtml,
                    );
                    candidate.matched_keyword = Some(keyword.clone());
                    candidate.published_at = extracted.date_parsed;
                    candidate.date_confidence = extracted.date_confidence;
                    outcome.candidates.push(candidate);
                }
            }
        }

        outcome.duration = started.elapsed();
        outcome
    }
}
