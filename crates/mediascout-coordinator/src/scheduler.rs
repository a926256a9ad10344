//! Hourly due-brand discovery: finds brands whose scrape interval has
//! elapsed and fires a [`Coordinator::run_scrape`] per brand, isolating
//! one brand's failure from the rest of the batch.

use crate::coordinator::Coordinator;
use chrono::Utc;
use mediascout_store::Store;
use mediascout_types::errors::ScrapeError;
use mediascout_types::run::Trigger;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const BASE_INTERVAL_SECS: i64 = 3600;
const JITTER_SECS: i64 = 600;

pub struct Scheduler {
    coordinator: Arc<Coordinator>,
    store: Arc<dyn Store>,
}

impl Scheduler {
    pub fn new(coordinator: Arc<Coordinator>, store: Arc<dyn Store>) -> Self {
        Self { coordinator, store }
    }

    /// Runs the discovery tick on an hourly cadence (±10 minutes of
    /// jitter) until the process exits.
    pub async fn run_forever(&self) {
        loop {
            self.tick().await;
            let jitter = fastrand::i64(-JITTER_SECS..=JITTER_SECS);
            let sleep_secs = (BASE_INTERVAL_SECS + jitter).max(60) as u64;
            tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
        }
    }

    /// Discovers due brands and fires one scrape per brand, each isolated
    /// in its own task so a slow or failing brand never blocks the rest.
    pub async fn tick(&self) {
        let now = Utc::now();
        let due = match self.store.due_brands(now).await {
            Ok(brands) => brands,
            Err(err) => {
                warn!(error = %err, "scheduler failed to list due brands");
                return;
            }
        };

        info!(due_count = due.len(), "scheduler tick found due brands");

        for brand in due {
            let coordinator = self.coordinator.clone();
            let brand_id = brand.id;
            tokio::spawn(async move {
                match coordinator.run_scrape(brand_id, Trigger::Schedule).await {
                    Ok(summary) => {
                        info!(
                            run_id = summary.run_id.as_str(),
                            brand_id = %brand_id,
                            accepted_mentions = summary.accepted_mentions,
                            "scheduled scrape complete"
                        );
                    }
                    Err(ScrapeError::Locked { .. }) => {
                        // Another run (API-triggered or a prior tick that
                        // overran) already holds the lock; skip quietly.
                    }
                    Err(err) => {
                        warn!(brand_id = %brand_id, error = %err, "scheduled scrape failed");
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::ProviderCredentials;
    use mediascout_governor::RateGovernor;
    use mediascout_http::HttpClient;
    use mediascout_store::{InMemoryRecipeStore, InMemoryStore};
    use mediascout_types::config::ProviderToggles;
    use mediascout_types::model::Brand;
    use mediascout_types::ScrapingConfig;

    fn scheduler(store: Arc<InMemoryStore>) -> Scheduler {
        let config = Arc::new(ScrapingConfig {
            providers: ProviderToggles {
                gnews_enabled: false,
                serpapi_enabled: false,
                rss_enabled: false,
                configurable_enabled: false,
            },
            ..ScrapingConfig::default()
        });
        let coordinator = Arc::new(Coordinator::new(
            store.clone(),
            Arc::new(InMemoryRecipeStore::new()),
            Arc::new(RateGovernor::new(config.clone())),
            Arc::new(HttpClient::new(config.clone()).unwrap()),
            config,
            ProviderCredentials::default(),
            None,
        ));
        Scheduler::new(coordinator, store)
    }

    #[tokio::test]
    async fn tick_skips_brands_that_are_not_due() {
        let store = Arc::new(InMemoryStore::new());
        let mut brand = Brand::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        brand.last_scraped_at = Some(Utc::now());
        let brand_id = brand.id;
        store.seed_brand(brand);

        let scheduler = scheduler(store.clone());
        scheduler.tick().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let brand_after = store.get_brand(brand_id).await.unwrap();
        assert!(!brand_after.scrape_in_progress);
        assert!(brand_after.last_scraped_at.is_some());
    }

    #[tokio::test]
    async fn tick_runs_due_brands_and_releases_their_lock() {
        let store = Arc::new(InMemoryStore::new());
        let brand = Brand::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        let brand_id = brand.id;
        store.seed_brand(brand);

        let scheduler = scheduler(store.clone());
        scheduler.tick().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let brand_after = store.get_brand(brand_id).await.unwrap();
        assert!(!brand_after.scrape_in_progress);
    }
}
