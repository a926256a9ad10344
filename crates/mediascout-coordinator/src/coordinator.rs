//! Scrape-run state machine: acquire the brand's lock, build the
//! provider set, fetch mentions, score and persist them, and guarantee
//! the lock is released on every exit path.

use crate::scoring::score_candidate;
use crate::types::RunSummary;
use chrono::Utc;
use mediascout_governor::RateGovernor;
use mediascout_http::HttpClient;
use mediascout_orchestrator::Orchestrator;
use mediascout_providers::{ConfigurableHtmlProvider, NewsApiProvider, Provider, RssProvider, SearchApiProvider};
use mediascout_relevance::RelevanceScorer;
use mediascout_store::{SourceRecipeStore, Store};
use mediascout_types::errors::{ScrapeError, ScrapeResult};
use mediascout_types::mention::{Mention, MentionKeyword};
use mediascout_types::model::{Keyword, Topic};
use mediascout_types::run::{ScrapeRunId, Trigger};
use mediascout_types::ScrapingConfig;
use mediascout_util::{effective_tld_plus_one, normalize_url};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Static configuration the coordinator needs beyond what lives in
/// [`ScrapingConfig`]: provider credentials and RSS seed feeds, which
/// have no natural home in the shared config type since they're
/// deployment secrets rather than tunables.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub news_api_key: Option<String>,
    pub search_api_key: Option<String>,
    pub rss_seed_urls: Vec<String>,
}

pub struct Coordinator {
    store: Arc<dyn Store>,
    recipe_store: Arc<dyn SourceRecipeStore>,
    governor: Arc<RateGovernor>,
    http: Arc<HttpClient>,
    config: Arc<ScrapingConfig>,
    credentials: ProviderCredentials,
    relevance_scorer: Option<Arc<dyn RelevanceScorer>>,
}

impl Coordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn Store>,
        recipe_store: Arc<dyn SourceRecipeStore>,
        governor: Arc<RateGovernor>,
        http: Arc<HttpClient>,
        config: Arc<ScrapingConfig>,
        credentials: ProviderCredentials,
        relevance_scorer: Option<Arc<dyn RelevanceScorer>>,
    ) -> Self {
        Self {
            store,
            recipe_store,
            governor,
            http,
            config,
            credentials,
            relevance_scorer,
        }
    }

    async fn build_providers(&self) -> ScrapeResult<Vec<Arc<dyn Provider>>> {
        let mut providers: Vec<Arc<dyn Provider>> = Vec::new();

        if self.config.providers.gnews_enabled {
            if let Some(key) = &self.credentials.news_api_key {
                providers.push(Arc::new(NewsApiProvider::new(
                    self.http.clone(),
                    self.governor.clone(),
                    key.clone(),
                )));
            }
        }
        if self.config.providers.serpapi_enabled {
            if let Some(key) = &self.credentials.search_api_key {
                providers.push(Arc::new(SearchApiProvider::new(
                    self.http.clone(),
                    self.governor.clone(),
                    key.clone(),
                )));
            }
        }
        if self.config.providers.rss_enabled && !self.credentials.rss_seed_urls.is_empty() {
            providers.push(Arc::new(RssProvider::new(
                self.http.clone(),
                self.governor.clone(),
                self.credentials.rss_seed_urls.clone(),
            )));
        }
        if self.config.providers.configurable_enabled {
            let recipes: Vec<_> = self
                .recipe_store
                .list_all()
                .await?
                .into_iter()
                .filter(|recipe| recipe.is_discoverable())
                .collect();
            if !recipes.is_empty() {
                providers.push(Arc::new(ConfigurableHtmlProvider::new(
                    self.http.clone(),
                    self.governor.clone(),
                    recipes,
                )));
            }
        }

        Ok(providers)
    }

    /// Runs one scrape for `brand_id`, guaranteeing the brand's lock is
    /// released (and `last_scraped_at` stamped) whether the run succeeds,
    /// errors, or exceeds its wall-clock budget.
    pub async fn run_scrape(self: Arc<Self>, brand_id: Uuid, trigger: Trigger) -> ScrapeResult<RunSummary> {
        let now = Utc::now();
        let run_id = ScrapeRunId::generate(brand_id);
        self.acquire_lock_or_locked_error(brand_id, now, &run_id).await?;
        self.run_locked(brand_id, run_id, trigger).await
    }

    /// Acquires the brand's lock synchronously (so the caller can
    /// distinguish "accepted" from "already running") and continues the
    /// run on a detached task. Used by the HTTP surface, where a request
    /// handler must answer immediately rather than block for the whole
    /// run's duration.
    pub async fn try_start(self: Arc<Self>, brand_id: Uuid, trigger: Trigger) -> ScrapeResult<ScrapeRunId> {
        let now = Utc::now();
        let run_id = ScrapeRunId::generate(brand_id);
        self.acquire_lock_or_locked_error(brand_id, now, &run_id).await?;

        let spawned_run_id = run_id.clone();
        let coordinator = self.clone();
        tokio::spawn(async move {
            if let Err(err) = coordinator.run_locked(brand_id, spawned_run_id, trigger).await {
                warn!(brand_id = %brand_id, error = %err, "background scrape run failed");
            }
        });

        Ok(run_id)
    }

    async fn acquire_lock_or_locked_error(
        &self,
        brand_id: Uuid,
        now: chrono::DateTime<Utc>,
        run_id: &ScrapeRunId,
    ) -> ScrapeResult<()> {
        if self.store.try_acquire_lock(brand_id, now, run_id).await? {
            Ok(())
        } else {
            let brand = self.store.get_brand(brand_id).await?;
            Err(ScrapeError::Locked {
                brand_id: brand_id.to_string(),
                started_at: brand.scrape_started_at.unwrap_or(now),
            })
        }
    }

    /// Runs the scrape to completion under the run budget, guaranteeing
    /// the lock is released no matter how `execute` exits. Assumes the
    /// caller already holds the brand's lock.
    async fn run_locked(self: Arc<Self>, brand_id: Uuid, run_id: ScrapeRunId, trigger: Trigger) -> ScrapeResult<RunSummary> {
        let outcome = tokio::time::timeout(self.config.run_budget, self.execute(brand_id, &run_id, trigger)).await;

        if let Err(err) = self.store.release_lock(brand_id, Utc::now()).await {
            warn!(run_id = run_id.as_str(), brand_id = %brand_id, error = %err, "failed to release scrape lock");
        }

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(run_id = run_id.as_str(), brand_id = %brand_id, "scrape run exceeded its budget");
                Err(ScrapeError::Timeout {
                    operation: format!("run_scrape brand={brand_id}"),
                })
            }
        }
    }

    async fn execute(&self, brand_id: Uuid, run_id: &ScrapeRunId, trigger: Trigger) -> ScrapeResult<RunSummary> {
        let brand = self.store.get_brand(brand_id).await?;
        let topics = self.store.active_topics(brand_id).await?;

        // `Brand` carries no display name; the brand id stands in for
        // `{brand}` template substitution until brand profiles grow one.
        let brand_name = brand.id.to_string();

        let mut topic_keywords: Vec<(Topic, Vec<Keyword>)> = Vec::new();
        let mut queries: Vec<String> = Vec::new();
        for topic in topics {
            let keywords = self.store.active_keywords(topic.id).await?;
            for keyword in &keywords {
                queries.push(topic.build_query(&brand_name, &keyword.value));
            }
            topic_keywords.push((topic, keywords));
        }

        if topic_keywords.is_empty() {
            info!(run_id = run_id.as_str(), brand_id = %brand_id, "brand has no active topics, nothing to scrape");
            return Ok(RunSummary::empty(run_id.clone(), trigger));
        }

        let providers = self.build_providers().await?;
        let orchestrator = Orchestrator::new(self.config.clone());
        // Cutoff filter: only bring in mentions published since the
        // brand's last successful scrape; a brand with no prior run uses
        // the configured lookback window instead of an unbounded scan.
        let from_date = Some(brand.last_scraped_at.unwrap_or_else(|| {
            Utc::now() - chrono::Duration::hours(self.config.default_lookback_hours)
        }));
        let result = orchestrator
            .fetch_all_mentions(
                &queries,
                from_date,
                None,
                &providers,
                self.relevance_scorer.as_deref(),
                &brand_name,
                run_id.as_str(),
            )
            .await;

        let discovered_at = Utc::now();
        let mut platform_cache: HashMap<String, Uuid> = HashMap::new();
        let mut mentions = Vec::new();
        let mut mention_keywords = Vec::new();

        for candidate in result.candidates {
            let Some(scored) = score_candidate(&candidate, &topic_keywords) else {
                continue;
            };

            let normalized_url = normalize_url(&candidate.url);
            if self.store.mention_exists(&normalized_url, scored.topic_id).await? {
                continue;
            }

            let domain = effective_tld_plus_one(&candidate.url);
            let platform_id = match platform_cache.get(&domain) {
                Some(id) => *id,
                None => {
                    let id = self.store.upsert_platform(&domain).await?;
                    platform_cache.insert(domain, id);
                    id
                }
            };

            let mention_id = Uuid::new_v4();
            mentions.push(Mention {
                id: mention_id,
                brand_id,
                topic_id: scored.topic_id,
                primary_keyword_id: scored.primary_keyword_id,
                platform_id,
                title: candidate.title,
                teaser: Mention::clamp_teaser(&candidate.teaser),
                normalized_url,
                raw_url: candidate.url,
                published_at: candidate.published_at,
                read_status: false,
                notified_status: false,
                discovered_at,
                scrape_run_id: run_id.as_str().to_string(),
            });
            mention_keywords.push(MentionKeyword {
                mention_id,
                keyword_id: scored.primary_keyword_id,
                matched_in: scored.matched_in,
                score: scored.score,
            });
        }

        let accepted_mentions = mentions.len();
        if !mentions.is_empty() {
            self.store.insert_mentions(&mentions).await?;
            self.store.insert_mention_keywords(&mention_keywords).await?;
        }

        info!(
            run_id = run_id.as_str(),
            brand_id = %brand_id,
            accepted_mentions,
            provider_errors = result.provider_errors.len(),
            guardrail_events = result.guardrail_events.len(),
            "scrape run complete"
        );

        Ok(RunSummary {
            run_id: run_id.clone(),
            trigger,
            accepted_mentions,
            provider_errors: result.provider_errors.len(),
            guardrail_events: result.guardrail_events.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediascout_store::{InMemoryRecipeStore, InMemoryStore};
    use mediascout_types::config::ProviderToggles;
    use mediascout_types::model::Brand;

    fn coordinator(store: Arc<InMemoryStore>, config: ScrapingConfig) -> Arc<Coordinator> {
        let config = Arc::new(config);
        Arc::new(Coordinator::new(
            store,
            Arc::new(InMemoryRecipeStore::new()),
            Arc::new(RateGovernor::new(config.clone())),
            Arc::new(HttpClient::new(config.clone()).unwrap()),
            config,
            ProviderCredentials::default(),
            None,
        ))
    }

    fn no_providers_config() -> ScrapingConfig {
        ScrapingConfig {
            providers: ProviderToggles {
                gnews_enabled: false,
                serpapi_enabled: false,
                rss_enabled: false,
                configurable_enabled: false,
            },
            ..ScrapingConfig::default()
        }
    }

    #[tokio::test]
    async fn locked_brand_is_rejected_without_touching_the_store_further() {
        let store = Arc::new(InMemoryStore::new());
        let mut brand = Brand::new(Uuid::new_v4(), Uuid::new_v4());
        brand.scrape_in_progress = true;
        brand.scrape_started_at = Some(Utc::now());
        let brand_id = brand.id;
        store.seed_brand(brand);

        let coordinator = coordinator(store, no_providers_config());
        let err = coordinator
            .run_scrape(brand_id, Trigger::Api)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Locked { .. }));
    }

    #[tokio::test]
    async fn brand_with_no_active_topics_short_circuits_and_releases_the_lock() {
        let store = Arc::new(InMemoryStore::new());
        let brand = Brand::new(Uuid::new_v4(), Uuid::new_v4());
        let brand_id = brand.id;
        store.seed_brand(brand);

        let coordinator = coordinator(store.clone(), no_providers_config());
        let summary = coordinator.run_scrape(brand_id, Trigger::Schedule).await.unwrap();
        assert_eq!(summary.accepted_mentions, 0);

        let brand_after = store.get_brand(brand_id).await.unwrap();
        assert!(!brand_after.scrape_in_progress);
        assert!(brand_after.last_scraped_at.is_some());
    }

    #[tokio::test]
    async fn run_with_topics_but_no_enabled_providers_yields_an_empty_accepted_set() {
        let store = Arc::new(InMemoryStore::new());
        let brand = Brand::new(Uuid::new_v4(), Uuid::new_v4());
        let brand_id = brand.id;
        store.seed_brand(brand);
        let topic = Topic {
            id: Uuid::new_v4(),
            brand_id,
            name: "Prices".into(),
            is_active: true,
            query_template: None,
            updated_at: Utc::now(),
        };
        store.seed_topic(topic.clone());
        store.seed_keyword(Keyword {
            id: Uuid::new_v4(),
            topic_id: topic.id,
            value: "rabat".into(),
        });

        let coordinator = coordinator(store.clone(), no_providers_config());
        let summary = coordinator.run_scrape(brand_id, Trigger::Api).await.unwrap();
        assert_eq!(summary.accepted_mentions, 0);

        let brand_after = store.get_brand(brand_id).await.unwrap();
        assert!(!brand_after.scrape_in_progress);
    }
}
