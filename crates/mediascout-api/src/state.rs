//! Shared application state handed to every handler via axum's `State`
//! extractor.

use mediascout_coordinator::Coordinator;
use mediascout_metrics::ScrapeMetrics;
use mediascout_store::Store;
use mediascout_types::errors::ScrapeResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub coordinator: Arc<Coordinator>,
    pub metrics: Arc<ScrapeMetrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, coordinator: Arc<Coordinator>, metrics: Arc<ScrapeMetrics>) -> Self {
        Self {
            store,
            coordinator,
            metrics,
        }
    }

    pub async fn health_check(&self) -> ScrapeResult<()> {
        self.store.health_check().await
    }
}
