//! Shared provider capability surface: one trait, several backends, and a
//! caller-side guarantee that a backend's failure never aborts the whole
//! search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediascout_types::candidate::{ProviderTag, RawCandidate};
use std::time::Duration;

/// One provider failure that did not abort the run. `error_type` mirrors
/// [`mediascout_types::errors::ScrapeError::error_type_label`] so it can
/// feed the same metric dimension.
#[derive(Debug, Clone)]
pub struct ProviderErrorEvent {
    pub provider: ProviderTag,
    pub run_id: String,
    pub error_type: String,
    pub message: String,
}

/// Everything the orchestrator needs to record about one provider's pass:
/// whatever it managed to collect, every error it swallowed along the
/// way, and how long the whole call took.
#[derive(Debug, Clone, Default)]
pub struct ProviderRunOutcome {
    pub candidates: Vec<RawCandidate>,
    pub errors: Vec<ProviderErrorEvent>,
    pub duration: Duration,
}

/// `scrape(keywords, from_date, to_date, run_id) -> list<RawCandidate>`.
/// Implementations MUST NOT propagate errors out of `scrape` — every
/// failure is caught, logged, and folded into the returned outcome so one
/// bad provider never fails the whole run.
#[async_trait]
pub trait Provider: Send + Sync {
    fn tag(&self) -> ProviderTag;

    async fn scrape(
        &self,
        keywords: &[String],
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        run_id: &str,
    ) -> ProviderRunOutcome;
}
