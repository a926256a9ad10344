//! In-memory `Store`/`SourceRecipeStore` adapter for tests and local
//! runs, backed by `dashmap` instead of an external system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mediascout_types::errors::{ScrapeError, ScrapeResult};
use mediascout_types::mention::MentionKeyword;
use mediascout_types::model::{Brand, Keyword, SourceRecipe, Topic};
use mediascout_types::run::ScrapeRunId;
use mediascout_types::Mention;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

use crate::traits::{SourceRecipeStore, Store};

#[derive(Default)]
pub struct InMemoryStore {
    brands: DashMap<Uuid, Brand>,
    topics: DashMap<Uuid, Topic>,
    keywords: DashMap<Uuid, Keyword>,
    mentions: Mutex<Vec<Mention>>,
    mention_keywords: Mutex<Vec<MentionKeyword>>,
    mention_keys: DashMap<(String, Uuid), ()>,
    platforms: DashMap<String, Uuid>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_brand(&self, brand: Brand) {
        self.brands.insert(brand.id, brand);
    }

    pub fn seed_topic(&self, topic: Topic) {
        self.topics.insert(topic.id, topic);
    }

    pub fn seed_keyword(&self, keyword: Keyword) {
        self.keywords.insert(keyword.id, keyword);
    }

    pub fn mentions_snapshot(&self) -> Vec<Mention> {
        self.mentions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_brand(&self, brand_id: Uuid) -> ScrapeResult<Brand> {
        self.brands
            .get(&brand_id)
            .map(|b| b.clone())
            .ok_or(ScrapeError::BrandNotFound {
                brand_id: brand_id.to_string(),
            })
    }

    async fn due_brands(&self, now: DateTime<Utc>) -> ScrapeResult<Vec<Brand>> {
        Ok(self
            .brands
            .iter()
            .filter(|entry| entry.is_active && entry.is_due(now))
            .map(|entry| entry.clone())
            .collect())
    }

    async fn try_acquire_lock(
        &self,
        brand_id: Uuid,
        now: DateTime<Utc>,
        _run_id: &ScrapeRunId,
    ) -> ScrapeResult<bool> {
        let mut brand = self
            .brands
            .get_mut(&brand_id)
            .ok_or(ScrapeError::BrandNotFound {
                brand_id: brand_id.to_string(),
            })?;
        if brand.lock_acquirable(now) {
            brand.scrape_in_progress = true;
            brand.scrape_started_at = Some(now);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn release_lock(&self, brand_id: Uuid, now: DateTime<Utc>) -> ScrapeResult<()> {
        if let Some(mut brand) = self.brands.get_mut(&brand_id) {
            brand.scrape_in_progress = false;
            brand.scrape_started_at = None;
            brand.last_scraped_at = Some(now);
        }
        Ok(())
    }

    async fn active_topics(&self, brand_id: Uuid) -> ScrapeResult<Vec<Topic>> {
        Ok(self
            .topics
            .iter()
            .filter(|entry| entry.brand_id == brand_id && entry.is_active)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn active_keywords(&self, topic_id: Uuid) -> ScrapeResult<Vec<Keyword>> {
        Ok(self
            .keywords
            .iter()
            .filter(|entry| entry.topic_id == topic_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn mention_exists(&self, normalized_url: &str, topic_id: Uuid) -> ScrapeResult<bool> {
        Ok(self
            .mention_keys
            .contains_key(&(normalized_url.to_string(), topic_id)))
    }

    async fn insert_mentions(&self, mentions: &[Mention]) -> ScrapeResult<()> {
        let mut store = self.mentions.lock().unwrap();
        for mention in mentions {
            let key = (mention.normalized_url.clone(), mention.topic_id);
            if self.mention_keys.contains_key(&key) {
                continue;
            }
            self.mention_keys.insert(key, ());
            store.push(mention.clone());
        }
        Ok(())
    }

    async fn insert_mention_keywords(&self, links: &[MentionKeyword]) -> ScrapeResult<()> {
        let mut store = self.mention_keywords.lock().unwrap();
        let existing: HashSet<(Uuid, Uuid)> =
            store.iter().map(|l| (l.mention_id, l.keyword_id)).collect();
        for link in links {
            if !existing.contains(&(link.mention_id, link.keyword_id)) {
                store.push(link.clone());
            }
        }
        Ok(())
    }

    async fn upsert_platform(&self, domain: &str) -> ScrapeResult<Uuid> {
        if let Some(id) = self.platforms.get(domain) {
            return Ok(*id);
        }
        let id = Uuid::new_v4();
        self.platforms.insert(domain.to_string(), id);
        Ok(id)
    }

    async fn health_check(&self) -> ScrapeResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecipeStore {
    recipes: DashMap<String, SourceRecipe>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceRecipeStore for InMemoryRecipeStore {
    async fn get_by_domain(&self, domain: &str) -> ScrapeResult<Option<SourceRecipe>> {
        let labels: Vec<&str> = domain.split('.').collect();
        for i in 0..labels.len() {
            let candidate = labels[i..].join(".");
            if let Some(recipe) = self.recipes.get(&candidate) {
                return Ok(Some(recipe.clone()));
            }
        }
        Ok(None)
    }

    async fn upsert(&self, recipe: SourceRecipe) -> ScrapeResult<()> {
        self.recipes.insert(recipe.domain.clone(), recipe);
        Ok(())
    }

    async fn delete(&self, domain: &str) -> ScrapeResult<()> {
        self.recipes.remove(domain);
        Ok(())
    }

    async fn list_all(&self) -> ScrapeResult<Vec<SourceRecipe>> {
        Ok(self.recipes.iter().map(|e| e.clone()).collect())
    }
}
