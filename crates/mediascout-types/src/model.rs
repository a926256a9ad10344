//! Brand / Topic / Keyword / Source Recipe — the scraping core's domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How stale a brand's scrape lock must be before a new run may reclaim it.
pub const STALE_LOCK_MINUTES: i64 = 180;

/// A user-owned brand scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brand {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub scrape_frequency_hours: u32,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub scrape_in_progress: bool,
    pub scrape_started_at: Option<DateTime<Utc>>,
    /// `None` means "use the global default".
    pub allowed_languages: Option<Vec<String>>,
}

impl Brand {
    pub fn new(id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id,
            owner_id,
            is_active: true,
            scrape_frequency_hours: 24,
            last_scraped_at: None,
            scrape_in_progress: false,
            scrape_started_at: None,
            allowed_languages: None,
        }
    }

    /// Whether this brand is due for a scrape, nulls counting as "due".
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_scraped_at {
            None => true,
            Some(last) => now - last >= Duration::hours(self.scrape_frequency_hours as i64),
        }
    }

    /// A held lock is reclaimable once it has been open longer than
    /// [`STALE_LOCK_MINUTES`].
    pub fn lock_is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.scrape_started_at {
            Some(started) => now - started >= Duration::minutes(STALE_LOCK_MINUTES),
            None => true,
        }
    }

    /// Whether a new run may acquire the lock right now: either the brand
    /// is idle, or its lock is stale and reclaimable.
    pub fn lock_acquirable(&self, now: DateTime<Utc>) -> bool {
        !self.scrape_in_progress || self.lock_is_stale(now)
    }
}

/// A topic within a brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub is_active: bool,
    /// Pattern allowing `{brand}` + `{keyword}` substitution.
    pub query_template: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    /// Build a context-aware query string for this topic and keyword.
    /// Falls back to the raw keyword when no template is configured.
    pub fn build_query(&self, brand_name: &str, keyword: &str) -> String {
        match &self.query_template {
            Some(template) => template
                .replace("{brand}", brand_name)
                .replace("{keyword}", keyword),
            None => keyword.to_string(),
        }
    }
}

/// A keyword belonging to a topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyword {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub value: String,
}

/// Discovery strategy a [`SourceRecipe`] supports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryType {
    Rss,
    Sitemap,
    SiteSearch,
}

/// Per-domain extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRecipe {
    pub domain: String,
    pub search_url_pattern: String,
    pub title_selector: String,
    pub content_selector: String,
    pub date_selector: String,
    pub rss_urls: Vec<String>,
    pub sitemap_url: Option<String>,
    pub discovery_type: DiscoveryType,
}

impl SourceRecipe {
    /// A recipe participates in configurable-HTML discovery only if
    /// `search_url_pattern` contains `{keyword}` OR an RSS/sitemap
    /// alternative is present.
    pub fn is_discoverable(&self) -> bool {
        self.search_url_pattern.contains("{keyword}")
            || !self.rss_urls.is_empty()
            || self.sitemap_url.is_some()
    }

    /// A recipe is exposed to a given discovery mode only when that
    /// mode's prerequisite is satisfied.
    pub fn supports(&self, discovery_type: DiscoveryType) -> bool {
        match discovery_type {
            DiscoveryType::Rss => !self.rss_urls.is_empty(),
            DiscoveryType::Sitemap => self.sitemap_url.is_some(),
            DiscoveryType::SiteSearch => self.search_url_pattern.contains("{keyword}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> Brand {
        Brand::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn brand_with_no_history_is_due() {
        assert!(brand().is_due(Utc::now()));
    }

    #[test]
    fn brand_respects_frequency() {
        let mut b = brand();
        b.last_scraped_at = Some(Utc::now());
        assert!(!b.is_due(Utc::now()));
        assert!(b.is_due(Utc::now() + Duration::hours(25)));
    }

    #[test]
    fn stale_lock_is_reclaimable() {
        let mut b = brand();
        b.scrape_in_progress = true;
        b.scrape_started_at = Some(Utc::now() - Duration::minutes(200));
        assert!(b.lock_acquirable(Utc::now()));
    }

    #[test]
    fn fresh_lock_blocks_acquisition() {
        let mut b = brand();
        b.scrape_in_progress = true;
        b.scrape_started_at = Some(Utc::now() - Duration::minutes(5));
        assert!(!b.lock_acquirable(Utc::now()));
    }

    #[test]
    fn recipe_discoverable_variants() {
        let mut recipe = SourceRecipe {
            domain: "example.com".into(),
            search_url_pattern: "https://example.com/search?q=static".into(),
            title_selector: "h1".into(),
            content_selector: "article".into(),
            date_selector: "time".into(),
            rss_urls: vec![],
            sitemap_url: None,
            discovery_type: DiscoveryType::SiteSearch,
        };
        assert!(!recipe.is_discoverable());

        recipe.rss_urls.push("https://example.com/feed".into());
        assert!(recipe.is_discoverable());
        assert!(recipe.supports(DiscoveryType::Rss));
        assert!(!recipe.supports(DiscoveryType::SiteSearch));
    }

    #[test]
    fn topic_builds_query_from_template() {
        let topic = Topic {
            id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            name: "Prices".into(),
            is_active: true,
            query_template: Some("{brand} {keyword} tilbud".into()),
            updated_at: Utc::now(),
        };
        assert_eq!(topic.build_query("Netto", "rabat"), "Netto rabat tilbud");
    }

    #[test]
    fn topic_without_template_uses_raw_keyword() {
        let topic = Topic {
            id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            name: "Prices".into(),
            is_active: true,
            query_template: None,
            updated_at: Utc::now(),
        };
        assert_eq!(topic.build_query("Netto", "rabat"), "rabat");
    }
}
