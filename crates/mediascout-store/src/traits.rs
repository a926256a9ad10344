use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediascout_types::errors::ScrapeResult;
use mediascout_types::model::{Brand, Keyword, SourceRecipe, Topic};
use mediascout_types::run::ScrapeRunId;
use mediascout_types::{Mention, MentionKeyword};
use uuid::Uuid;

/// The persistence port the coordinator, orchestrator, and API all depend
/// on. Brand-lock operations use a conditional update so acquisition is
/// safe under concurrent callers without an external distributed lock.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_brand(&self, brand_id: Uuid) -> ScrapeResult<Brand>;

    /// Brands whose `last_scraped_at + scrape_frequency_hours` has
    /// elapsed (or never ran), restricted to active brands.
    async fn due_brands(&self, now: DateTime<Utc>) -> ScrapeResult<Vec<Brand>>;

    /// Attempts to acquire the brand's scrape lock: succeeds if the
    /// brand is idle, or if its lock is stale per `Brand::lock_is_stale`.
    /// Returns `false` (not an error) if another run holds a fresh lock.
    async fn try_acquire_lock(
        &self,
        brand_id: Uuid,
        now: DateTime<Utc>,
        run_id: &ScrapeRunId,
    ) -> ScrapeResult<bool>;

    /// Releases the lock and stamps `last_scraped_at`. Must be called on
    /// every exit path from a run, success or failure.
    async fn release_lock(&self, brand_id: Uuid, now: DateTime<Utc>) -> ScrapeResult<()>;

    async fn active_topics(&self, brand_id: Uuid) -> ScrapeResult<Vec<Topic>>;

    async fn active_keywords(&self, topic_id: Uuid) -> ScrapeResult<Vec<Keyword>>;

    /// `true` if a mention already exists for `(normalized_url, topic_id)`.
    async fn mention_exists(&self, normalized_url: &str, topic_id: Uuid) -> ScrapeResult<bool>;

    async fn insert_mentions(&self, mentions: &[Mention]) -> ScrapeResult<()>;

    async fn insert_mention_keywords(&self, links: &[MentionKeyword]) -> ScrapeResult<()>;

    /// Returns the platform id for `domain`, creating a row if needed.
    async fn upsert_platform(&self, domain: &str) -> ScrapeResult<Uuid>;

    /// A cheap liveness probe used by the `/health` endpoint.
    async fn health_check(&self) -> ScrapeResult<()>;
}

/// Per-domain extraction configuration, globally owned by the platform.
#[async_trait]
pub trait SourceRecipeStore: Send + Sync {
    /// Looks up a recipe for `domain`, falling back to progressively
    /// broader parent domains (e.g. `news.example.com` ->
    /// `example.com`) when no exact match exists.
    async fn get_by_domain(&self, domain: &str) -> ScrapeResult<Option<SourceRecipe>>;

    async fn upsert(&self, recipe: SourceRecipe) -> ScrapeResult<()>;

    async fn delete(&self, domain: &str) -> ScrapeResult<()>;

    async fn list_all(&self) -> ScrapeResult<Vec<SourceRecipe>>;
}
