//! The coordinator's run summary, returned from a successful
//! `run_scrape` call.

use mediascout_types::run::{ScrapeRunId, Trigger};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: ScrapeRunId,
    pub trigger: Trigger,
    pub accepted_mentions: usize,
    pub provider_errors: usize,
    pub guardrail_events: usize,
}

impl RunSummary {
    pub fn empty(run_id: ScrapeRunId, trigger: Trigger) -> Self {
        Self {
            run_id,
            trigger,
            accepted_mentions: 0,
            provider_errors: 0,
            guardrail_events: 0,
        }
    }
}
