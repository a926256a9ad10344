//! `fetch_all_mentions`: fans out across enabled providers under the
//! run's guardrails, then dedups, relevance-filters, and orders the
//! result.

mod types;

pub use types::{GuardrailEvent, OrchestratorResult};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use mediascout_providers::Provider;
use mediascout_relevance::RelevanceScorer;
use mediascout_types::config::ScrapingConfig;
use mediascout_util::clean_keyword;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Orchestrator {
    config: Arc<ScrapingConfig>,
}

impl Orchestrator {
    pub fn new(config: Arc<ScrapingConfig>) -> Self {
        Self { config }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn fetch_all_mentions(
        &self,
        keywords: &[String],
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        enabled_providers: &[Arc<dyn Provider>],
        relevance_scorer: Option<&dyn RelevanceScorer>,
        brand_name: &str,
        run_id: &str,
    ) -> OrchestratorResult {
        let mut guardrail_events = Vec::new();

        let mut cleaned: Vec<String> = keywords.iter().filter_map(|k| clean_keyword(k)).collect();
        if cleaned.len() > self.config.max_keywords_per_run {
            let dropped = cleaned.len() - self.config.max_keywords_per_run;
            cleaned.truncate(self.config.max_keywords_per_run);
            guardrail_events.push(GuardrailEvent::new(
                "max_keywords_per_run",
                format!("dropped {dropped} keywords over the per-run cap"),
            ));
        }

        let outcomes = join_all(
            enabled_providers
                .iter()
                .map(|provider| provider.scrape(&cleaned, from_date, to_date, run_id)),
        )
        .await;

        let mut candidates = Vec::new();
        let mut provider_errors = Vec::new();
        let mut provider_durations = Vec::new();
        for (provider, outcome) in enabled_providers.iter().zip(outcomes) {
            if !outcome.errors.is_empty() {
                warn!(
                    provider = provider.tag().as_str(),
                    run_id,
                    error_count = outcome.errors.len(),
                    "provider returned partial results"
                );
            }
            candidates.extend(outcome.candidates);
            provider_errors.extend(outcome.errors);
            provider_durations.push((provider.tag(), outcome.duration));
        }

        // Cutoff filter: drop candidates known to be older than
        // `from_date`. A candidate with no resolved date (including every
        // non-authoritative low-confidence date, which the extractor
        // already nulls) is never dropped here — there is no date to
        // compare, so it cannot be shown to violate the cutoff.
        if let Some(cutoff) = from_date {
            let before = candidates.len();
            candidates.retain(|c| match c.published_at {
                Some(dt) => dt >= cutoff,
                None => true,
            });
            let dropped = before - candidates.len();
            if dropped > 0 {
                info!(run_id, dropped, "cutoff filter dropped candidates older than from_date");
            }
        }

        if candidates.len() > self.config.max_total_urls_per_run {
            let dropped = candidates.len() - self.config.max_total_urls_per_run;
            candidates.truncate(self.config.max_total_urls_per_run);
            guardrail_events.push(GuardrailEvent::new(
                "max_total_urls_per_run",
                format!("dropped {dropped} candidates over the per-run cap"),
            ));
        }

        let deduped = mediascout_dedup::exact_dedup(candidates);
        let deduped = if self.config.fuzzy_dedup_enabled {
            mediascout_dedup::fuzzy_dedup(
                deduped,
                self.config.fuzzy_dedup_threshold,
                self.config.fuzzy_dedup_day_window,
            )
        } else {
            deduped
        };

        let mut filtered = match relevance_scorer {
            Some(scorer) => mediascout_relevance::filter_candidates(scorer, deduped, brand_name).await,
            None => deduped,
        };

        filtered.sort_by(order_candidates);

        info!(run_id, accepted = filtered.len(), "orchestrator run complete");

        OrchestratorResult {
            candidates: filtered,
            provider_errors,
            guardrail_events,
            provider_durations,
        }
    }
}

fn order_candidates(
    a: &mediascout_types::candidate::RawCandidate,
    b: &mediascout_types::candidate::RawCandidate,
) -> Ordering {
    cmp_published_desc_nulls_last(&a.published_at, &b.published_at)
        .then_with(|| b.date_confidence.cmp(&a.date_confidence))
        .then_with(|| a.title.cmp(&b.title))
}

fn cmp_published_desc_nulls_last(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediascout_providers::ProviderRunOutcome;
    use mediascout_types::candidate::{DateConfidence, ProviderTag, RawCandidate};
    use std::time::Duration;

    struct StubProvider {
        tag: ProviderTag,
        candidates: Vec<RawCandidate>,
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn tag(&self) -> ProviderTag {
            self.tag
        }

        async fn scrape(
            &self,
            _keywords: &[String],
            _from_date: Option<DateTime<Utc>>,
            _to_date: Option<DateTime<Utc>>,
            _run_id: &str,
        ) -> ProviderRunOutcome {
            ProviderRunOutcome {
                candidates: self.candidates.clone(),
                errors: Vec::new(),
                duration: Duration::from_millis(1),
            }
        }
    }

    fn candidate(title: &str, url: &str, days_ago: i64) -> RawCandidate {
        let mut c = RawCandidate::new(title, "teaser", url, "Source", ProviderTag::Rss);
        c.published_at = Some(Utc::now() - chrono::Duration::days(days_ago));
        c.date_confidence = DateConfidence::High;
        c
    }

    #[tokio::test]
    async fn caps_keywords_and_records_a_guardrail_event() {
        let config = Arc::new(ScrapingConfig {
            max_keywords_per_run: 2,
            ..ScrapingConfig::default()
        });
        let orchestrator = Orchestrator::new(config);
        let keywords = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = orchestrator
            .fetch_all_mentions(&keywords, None, None, &[], None, "Netto", "run-1")
            .await;
        assert_eq!(result.guardrail_events.len(), 1);
        assert_eq!(result.guardrail_events[0].guardrail, "max_keywords_per_run");
    }

    #[tokio::test]
    async fn orders_results_by_date_desc_then_confidence_then_title() {
        let config = Arc::new(ScrapingConfig::default());
        let orchestrator = Orchestrator::new(config);
        let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(StubProvider {
            tag: ProviderTag::Rss,
            candidates: vec![
                candidate("Older", "https://ex.com/a", 5),
                candidate("Newer", "https://ex.com/b", 1),
            ],
        })];
        let result = orchestrator
            .fetch_all_mentions(&["netto".to_string()], None, None, &providers, None, "Netto", "run-1")
            .await;
        assert_eq!(result.candidates[0].title, "Newer");
        assert_eq!(result.candidates[1].title, "Older");
    }

    #[tokio::test]
    async fn cutoff_filter_drops_candidates_older_than_from_date_but_keeps_undated_ones() {
        let config = Arc::new(ScrapingConfig::default());
        let orchestrator = Orchestrator::new(config);
        let mut undated = RawCandidate::new("Undated", "teaser", "https://ex.com/c", "Source", ProviderTag::ConfigurableHtml);
        undated.published_at = None;
        undated.date_confidence = DateConfidence::Low;
        let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(StubProvider {
            tag: ProviderTag::Rss,
            candidates: vec![
                candidate("Recent", "https://ex.com/a", 1),
                candidate("Stale", "https://ex.com/b", 30),
                undated,
            ],
        })];
        let from_date = Some(Utc::now() - chrono::Duration::days(7));
        let result = orchestrator
            .fetch_all_mentions(&["netto".to_string()], from_date, None, &providers, None, "Netto", "run-1")
            .await;
        let titles: Vec<&str> = result.candidates.iter().map(|c| c.title.as_str()).collect();
        assert!(titles.contains(&"Recent"));
        assert!(titles.contains(&"Undated"));
        assert!(!titles.contains(&"Stale"));
    }

    #[tokio::test]
    async fn one_provider_erroring_does_not_drop_the_others_results() {
        struct FailingProvider;
        #[async_trait]
        impl Provider for FailingProvider {
            fn tag(&self) -> ProviderTag {
                ProviderTag::NewsApi
            }
            async fn scrape(
                &self,
                _keywords: &[String],
                _from_date: Option<DateTime<Utc>>,
                _to_date: Option<DateTime<Utc>>,
                run_id: &str,
            ) -> ProviderRunOutcome {
                ProviderRunOutcome {
                    candidates: Vec::new(),
                    errors: vec![mediascout_providers::ProviderErrorEvent {
                        provider: ProviderTag::NewsApi,
                        run_id: run_id.to_string(),
                        error_type: "http_5xx".to_string(),
                        message: "boom".to_string(),
                    }],
                    duration: Duration::from_millis(1),
                }
            }
        }

        let config = Arc::new(ScrapingConfig::default());
        let orchestrator = Orchestrator::new(config);
        let providers: Vec<Arc<dyn Provider>> = vec![
            Arc::new(FailingProvider),
            Arc::new(StubProvider {
                tag: ProviderTag::Rss,
                candidates: vec![candidate("Ok article", "https://ex.com/a", 1)],
            }),
        ];
        let result = orchestrator
            .fetch_all_mentions(&["netto".to_string()], None, None, &providers, None, "Netto", "run-1")
            .await;
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.provider_errors.len(), 1);
    }
}
