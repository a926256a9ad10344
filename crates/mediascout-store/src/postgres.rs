//! PostgreSQL adapter: a pool-held struct implementing the Store ports,
//! using raw `sqlx::query`/`query_as` (no compile-time `query!` macros,
//! since no database is reachable here).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediascout_types::errors::{ScrapeError, ScrapeResult};
use mediascout_types::model::{Brand, DiscoveryType, Keyword, SourceRecipe, Topic};
use mediascout_types::run::ScrapeRunId;
use mediascout_types::{Mention, MentionKeyword};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::traits::{SourceRecipeStore, Store};

pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn store_err(context: &str, err: sqlx::Error) -> ScrapeError {
    ScrapeError::StoreError {
        message: format!("{context}: {err}"),
    }
}

/// Row shape for `brands`; decoupled from [`Brand`] so SQL column types
/// (e.g. a `TEXT[]` for nullable `allowed_languages`) never leak into the
/// domain model.
#[derive(sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    owner_id: Uuid,
    is_active: bool,
    scrape_frequency_hours: i32,
    last_scraped_at: Option<DateTime<Utc>>,
    scrape_in_progress: bool,
    scrape_started_at: Option<DateTime<Utc>>,
    allowed_languages: Option<Vec<String>>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Brand {
            id: row.id,
            owner_id: row.owner_id,
            is_active: row.is_active,
            scrape_frequency_hours: row.scrape_frequency_hours.max(0) as u32,
            last_scraped_at: row.last_scraped_at,
            scrape_in_progress: row.scrape_in_progress,
            scrape_started_at: row.scrape_started_at,
            allowed_languages: row.allowed_languages,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TopicRow {
    id: Uuid,
    brand_id: Uuid,
    name: String,
    is_active: bool,
    query_template: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<TopicRow> for Topic {
    fn from(row: TopicRow) -> Self {
        Topic {
            id: row.id,
            brand_id: row.brand_id,
            name: row.name,
            is_active: row.is_active,
            query_template: row.query_template,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct KeywordRow {
    id: Uuid,
    topic_id: Uuid,
    value: String,
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        Keyword {
            id: row.id,
            topic_id: row.topic_id,
            value: row.value,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SourceRecipeRow {
    domain: String,
    search_url_pattern: String,
    title_selector: String,
    content_selector: String,
    date_selector: String,
    rss_urls: Vec<String>,
    sitemap_url: Option<String>,
    discovery_type: String,
}

impl From<SourceRecipeRow> for SourceRecipe {
    fn from(row: SourceRecipeRow) -> Self {
        SourceRecipe {
            domain: row.domain,
            search_url_pattern: row.search_url_pattern,
            title_selector: row.title_selector,
            content_selector: row.content_selector,
            date_selector: row.date_selector,
            rss_urls: row.rss_urls,
            sitemap_url: row.sitemap_url,
            discovery_type: discovery_type_from_label(&row.discovery_type),
        }
    }
}

fn discovery_type_from_label(label: &str) -> DiscoveryType {
    match label {
        "sitemap" => DiscoveryType::Sitemap,
        "site_search" => DiscoveryType::SiteSearch,
        _ => DiscoveryType::Rss,
    }
}

fn discovery_type_label(discovery_type: DiscoveryType) -> &'static str {
    match discovery_type {
        DiscoveryType::Rss => "rss",
        DiscoveryType::Sitemap => "sitemap",
        DiscoveryType::SiteSearch => "site_search",
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn get_brand(&self, brand_id: Uuid) -> ScrapeResult<Brand> {
        sqlx::query_as::<_, BrandRow>(
            "SELECT id, owner_id, is_active, scrape_frequency_hours, last_scraped_at, \
             scrape_in_progress, scrape_started_at, allowed_languages \
             FROM brands WHERE id = $1",
        )
        .bind(brand_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| store_err("get_brand", e))?
        .map(Brand::from)
        .ok_or(ScrapeError::BrandNotFound {
            brand_id: brand_id.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn due_brands(&self, now: DateTime<Utc>) -> ScrapeResult<Vec<Brand>> {
        let rows = sqlx::query_as::<_, BrandRow>(
            "SELECT id, owner_id, is_active, scrape_frequency_hours, last_scraped_at, \
             scrape_in_progress, scrape_started_at, allowed_languages \
             FROM brands \
             WHERE is_active \
               AND (last_scraped_at IS NULL \
                    OR last_scraped_at + (scrape_frequency_hours || ' hours')::interval <= $1)",
        )
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| store_err("due_brands", e))?;
        Ok(rows.into_iter().map(Brand::from).collect())
    }

    #[instrument(skip(self, run_id))]
    async fn try_acquire_lock(
        &self,
        brand_id: Uuid,
        now: DateTime<Utc>,
        run_id: &ScrapeRunId,
    ) -> ScrapeResult<bool> {
        let stale_cutoff =
            now - chrono::Duration::minutes(mediascout_types::model::STALE_LOCK_MINUTES);
        let result = sqlx::query(
            "UPDATE brands SET scrape_in_progress = true, scrape_started_at = $2 \
             WHERE id = $1 AND (scrape_in_progress = false OR scrape_started_at <= $3)",
        )
        .bind(brand_id)
        .bind(now)
        .bind(stale_cutoff)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| store_err("try_acquire_lock", e))?;

        let acquired = result.rows_affected() == 1;
        debug!(brand_id = %brand_id, run_id = %run_id, acquired, "lock acquisition attempt");
        Ok(acquired)
    }

    #[instrument(skip(self))]
    async fn release_lock(&self, brand_id: Uuid, now: DateTime<Utc>) -> ScrapeResult<()> {
        sqlx::query(
            "UPDATE brands SET scrape_in_progress = false, scrape_started_at = NULL, \
             last_scraped_at = $2 WHERE id = $1",
        )
        .bind(brand_id)
        .bind(now)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| store_err("release_lock", e))?;
        Ok(())
    }

    async fn active_topics(&self, brand_id: Uuid) -> ScrapeResult<Vec<Topic>> {
        let rows = sqlx::query_as::<_, TopicRow>(
            "SELECT id, brand_id, name, is_active, query_template, updated_at \
             FROM topics WHERE brand_id = $1 AND is_active",
        )
        .bind(brand_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| store_err("active_topics", e))?;
        Ok(rows.into_iter().map(Topic::from).collect())
    }

    async fn active_keywords(&self, topic_id: Uuid) -> ScrapeResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, KeywordRow>(
            "SELECT id, topic_id, value FROM keywords WHERE topic_id = $1",
        )
        .bind(topic_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| store_err("active_keywords", e))?;
        Ok(rows.into_iter().map(Keyword::from).collect())
    }

    async fn mention_exists(&self, normalized_url: &str, topic_id: Uuid) -> ScrapeResult<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM mentions WHERE normalized_url = $1 AND topic_id = $2 LIMIT 1",
        )
        .bind(normalized_url)
        .bind(topic_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| store_err("mention_exists", e))?;
        Ok(row.is_some())
    }

    async fn insert_mentions(&self, mentions: &[Mention]) -> ScrapeResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_err("insert_mentions/begin", e))?;
        for mention in mentions {
            sqlx::query(
                "INSERT INTO mentions (id, brand_id, topic_id, primary_keyword_id, platform_id, \
                 title, teaser, normalized_url, raw_url, published_at, read_status, \
                 notified_status, discovered_at, scrape_run_id) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14) \
                 ON CONFLICT (normalized_url, topic_id) DO NOTHING",
            )
            .bind(mention.id)
            .bind(mention.brand_id)
            .bind(mention.topic_id)
            .bind(mention.primary_keyword_id)
            .bind(mention.platform_id)
            .bind(&mention.title)
            .bind(&mention.teaser)
            .bind(&mention.normalized_url)
            .bind(&mention.raw_url)
            .bind(mention.published_at)
            .bind(mention.read_status)
            .bind(mention.notified_status)
            .bind(mention.discovered_at)
            .bind(&mention.scrape_run_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_err("insert_mentions/row", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| store_err("insert_mentions/commit", e))?;
        Ok(())
    }

    async fn insert_mention_keywords(&self, links: &[MentionKeyword]) -> ScrapeResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_err("insert_mention_keywords/begin", e))?;
        for link in links {
            let matched_in = match link.matched_in {
                mediascout_types::mention::MatchedIn::Title => "title",
                mediascout_types::mention::MatchedIn::Teaser => "teaser",
            };
            sqlx::query(
                "INSERT INTO mention_keywords (mention_id, keyword_id, matched_in, score) \
                 VALUES ($1,$2,$3,$4) ON CONFLICT DO NOTHING",
            )
            .bind(link.mention_id)
            .bind(link.keyword_id)
            .bind(matched_in)
            .bind(link.score)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_err("insert_mention_keywords/row", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| store_err("insert_mention_keywords/commit", e))?;
        Ok(())
    }

    async fn upsert_platform(&self, domain: &str) -> ScrapeResult<Uuid> {
        let row: (Uuid,) = sqlx::query_as(
            "INSERT INTO platforms (id, domain) VALUES ($1, $2) \
             ON CONFLICT (domain) DO UPDATE SET domain = EXCLUDED.domain \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(domain)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| store_err("upsert_platform", e))?;
        Ok(row.0)
    }

    async fn health_check(&self) -> ScrapeResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| store_err("health_check", e))?;
        Ok(())
    }
}

pub struct PgSourceRecipeStore {
    pool: Arc<PgPool>,
}

impl PgSourceRecipeStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRecipeStore for PgSourceRecipeStore {
    async fn get_by_domain(&self, domain: &str) -> ScrapeResult<Option<SourceRecipe>> {
        for candidate in parent_domains(domain) {
            let recipe = sqlx::query_as::<_, SourceRecipeRow>(
                "SELECT domain, search_url_pattern, title_selector, content_selector, \
                 date_selector, rss_urls, sitemap_url, discovery_type \
                 FROM source_recipes WHERE domain = $1",
            )
            .bind(&candidate)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| store_err("get_by_domain", e))?;
            if let Some(recipe) = recipe {
                return Ok(Some(recipe.into()));
            }
        }
        Ok(None)
    }

    async fn upsert(&self, recipe: SourceRecipe) -> ScrapeResult<()> {
        sqlx::query(
            "INSERT INTO source_recipes \
             (domain, search_url_pattern, title_selector, content_selector, date_selector, \
              rss_urls, sitemap_url, discovery_type) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8) \
             ON CONFLICT (domain) DO UPDATE SET \
               search_url_pattern = EXCLUDED.search_url_pattern, \
               title_selector = EXCLUDED.title_selector, \
               content_selector = EXCLUDED.content_selector, \
               date_selector = EXCLUDED.date_selector, \
               rss_urls = EXCLUDED.rss_urls, \
               sitemap_url = EXCLUDED.sitemap_url, \
               discovery_type = EXCLUDED.discovery_type",
        )
        .bind(&recipe.domain)
        .bind(&recipe.search_url_pattern)
        .bind(&recipe.title_selector)
        .bind(&recipe.content_selector)
        .bind(&recipe.date_selector)
        .bind(&recipe.rss_urls)
        .bind(&recipe.sitemap_url)
        .bind(discovery_type_label(recipe.discovery_type))
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| store_err("upsert_recipe", e))?;
        Ok(())
    }

    async fn delete(&self, domain: &str) -> ScrapeResult<()> {
        sqlx::query("DELETE FROM source_recipes WHERE domain = $1")
            .bind(domain)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| store_err("delete_recipe", e))?;
        Ok(())
    }

    async fn list_all(&self) -> ScrapeResult<Vec<SourceRecipe>> {
        let rows = sqlx::query_as::<_, SourceRecipeRow>(
            "SELECT domain, search_url_pattern, title_selector, content_selector, \
             date_selector, rss_urls, sitemap_url, discovery_type FROM source_recipes",
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| store_err("list_all_recipes", e))?;
        Ok(rows.into_iter().map(SourceRecipe::from).collect())
    }
}

/// `news.example.co.uk` -> `["news.example.co.uk", "example.co.uk", "co.uk"]`,
/// most specific first, so the caller can stop at the first hit.
fn parent_domains(domain: &str) -> Vec<String> {
    let labels: Vec<&str> = domain.split('.').collect();
    (0..labels.len()).map(|i| labels[i..].join(".")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_domains_walks_from_specific_to_broad() {
        let domains = parent_domains("news.example.co.uk");
        assert_eq!(
            domains,
            vec!["news.example.co.uk", "example.co.uk", "co.uk"]
        );
    }
}
