//! The orchestrator's observable side channel: one event per guardrail
//! trip, so the caller can turn them into metrics without the
//! orchestrator depending on a metrics crate directly.

#[derive(Debug, Clone)]
pub struct GuardrailEvent {
    pub guardrail: String,
    pub provider: Option<String>,
    pub reason: String,
}

impl GuardrailEvent {
    pub fn new(guardrail: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            provider: None,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorResult {
    pub candidates: Vec<mediascout_types::candidate::RawCandidate>,
    pub provider_errors: Vec<mediascout_providers::ProviderErrorEvent>,
    pub guardrail_events: Vec<GuardrailEvent>,
    pub provider_durations: Vec<(mediascout_types::candidate::ProviderTag, std::time::Duration)>,
}
