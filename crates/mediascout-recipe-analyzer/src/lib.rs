//! Derives a [`SourceRecipe`] for a new domain from a sample article page
//! and its homepage: tries a bundled set of generic selectors against the
//! article, and a search-pattern probe against the homepage, verifying
//! each guess live before upserting. Grounded on
//! `mediascout_providers::ConfigurableHtmlProvider`'s discovery shape —
//! this crate derives the recipe that provider later consumes.

mod patterns;
mod selectors;

use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_store::SourceRecipeStore;
use mediascout_types::config::HttpProfile;
use mediascout_types::errors::{ScrapeError, ScrapeResult};
use mediascout_types::model::{DiscoveryType, SourceRecipe};
use mediascout_util::effective_tld_plus_one;
use std::sync::Arc;
use tracing::info;

pub use patterns::candidate_search_patterns;
pub use selectors::{best_content_selector, best_date_selector, best_title_selector};

const MIN_SEARCH_RESULT_BYTES: usize = 500;
const SOFT_404_MARKERS: &[&str] = &[
    "no results found",
    "nothing found",
    "0 results",
    "page not found",
    "this page could not be found",
];

pub struct RecipeAnalyzer {
    http: Arc<HttpClient>,
    governor: Arc<RateGovernor>,
    recipe_store: Arc<dyn SourceRecipeStore>,
}

impl RecipeAnalyzer {
    pub fn new(http: Arc<HttpClient>, governor: Arc<RateGovernor>, recipe_store: Arc<dyn SourceRecipeStore>) -> Self {
        Self {
            http,
            governor,
            recipe_store,
        }
    }

    /// Derives and upserts a recipe for `domain`. Idempotent: re-running
    /// with the same inputs overwrites the prior recipe with an
    /// equivalent one.
    pub async fn analyze(
        &self,
        domain: &str,
        sample_article_url: &str,
        homepage_url: &str,
        probe_keyword: &str,
    ) -> ScrapeResult<SourceRecipe> {
        let article_html = self.fetch(sample_article_url).await?;
        let homepage_html = self.fetch(homepage_url).await?;

        let title_selector = best_title_selector(&article_html).ok_or_else(|| ScrapeError::ParseError {
            message: format!("no title selector matched a sample article on {domain}"),
        })?;
        let content_selector = best_content_selector(&article_html).ok_or_else(|| ScrapeError::ParseError {
            message: format!("no content selector matched a sample article on {domain}"),
        })?;
        let date_selector = best_date_selector(&article_html).unwrap_or_else(|| "time".to_string());

        let search_url_pattern = self
            .derive_search_pattern(&homepage_html, homepage_url, probe_keyword)
            .await
            .unwrap_or_default();

        let recipe = SourceRecipe {
            domain: domain.to_string(),
            search_url_pattern,
            title_selector,
            content_selector,
            date_selector,
            rss_urls: Vec::new(),
            sitemap_url: None,
            discovery_type: DiscoveryType::SiteSearch,
        };

        self.recipe_store.upsert(recipe.clone()).await?;
        info!(domain, discoverable = recipe.is_discoverable(), "recipe analyzed and upserted");
        Ok(recipe)
    }

    async fn derive_search_pattern(&self, homepage_html: &str, homepage_url: &str, probe_keyword: &str) -> Option<String> {
        for candidate in candidate_search_patterns(homepage_html, homepage_url) {
            let encoded: String = url::form_urlencoded::byte_serialize(probe_keyword.as_bytes()).collect();
            let probe_url = candidate.replace("{keyword}", &encoded);
            if self.verify_search_result(&probe_url).await {
                return Some(candidate);
            }
        }
        None
    }

    async fn verify_search_result(&self, url: &str) -> bool {
        let Ok(body) = self.fetch(url).await else {
            return false;
        };
        if body.len() < MIN_SEARCH_RESULT_BYTES {
            return false;
        }
        let lowered = body.to_lowercase();
        !SOFT_404_MARKERS.iter().any(|marker| lowered.contains(marker))
    }

    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        let domain = effective_tld_plus_one(url);
        let _permit = self.governor.acquire(&domain, HttpProfile::Html).await?;
        let response = self.http.get(url, HttpProfile::Html).await?;
        Ok(response.body)
    }
}
