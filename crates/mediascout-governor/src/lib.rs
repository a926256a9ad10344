//! Rate limiting, concurrency caps, and circuit breaking for outbound
//! requests, keyed by registrable domain and request profile.

mod circuit;
mod concurrency;
mod limiter;

pub use circuit::CircuitState;
pub use concurrency::ConcurrencyCaps;
pub use limiter::DomainRateLimiter;

use dashmap::DashMap;
use mediascout_types::config::{HttpProfile, ScrapingConfig};
use mediascout_types::errors::ScrapeError;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedSemaphorePermit;
use tracing::debug;

/// Holds a domain's concurrency slot for the duration of a request.
/// Dropping it returns the slot to the pool.
pub struct GovernorPermit {
    _semaphore_permit: OwnedSemaphorePermit,
}

pub struct RateGovernor {
    config: Arc<ScrapingConfig>,
    limiter: DomainRateLimiter,
    concurrency: ConcurrencyCaps,
    circuits: DashMap<String, Mutex<CircuitState>>,
}

impl RateGovernor {
    pub fn new(config: Arc<ScrapingConfig>) -> Self {
        let concurrency = ConcurrencyCaps::new(config.max_in_flight_per_profile);
        Self {
            config,
            limiter: DomainRateLimiter::default(),
            concurrency,
            circuits: DashMap::new(),
        }
    }

    /// Gate a request to `domain` under `profile`: fails fast if the
    /// domain's circuit is open, otherwise blocks until a concurrency
    /// slot and a rate-limit token are both available.
    pub async fn acquire(
        &self,
        domain: &str,
        profile: HttpProfile,
    ) -> Result<GovernorPermit, ScrapeError> {
        {
            let mut state = self
                .circuits
                .entry(domain.to_string())
                .or_insert_with(|| Mutex::new(CircuitState::default()));
            let mut state = state.lock().unwrap();
            if !state.try_acquire(self.config.circuit_cooldown) {
                return Err(ScrapeError::CircuitOpen {
                    domain: domain.to_string(),
                });
            }
        }

        let semaphore_permit = self.concurrency.acquire(profile).await;
        let rps = self.config.http_profile(profile).rps;
        self.limiter.acquire(domain, profile, rps).await;

        Ok(GovernorPermit {
            _semaphore_permit: semaphore_permit,
        })
    }

    /// Record that a request to `domain` produced usable content,
    /// resetting its consecutive-failure count.
    pub fn record_success(&self, domain: &str) {
        if let Some(state) = self.circuits.get(domain) {
            state.lock().unwrap().record_success();
        }
    }

    /// Record that a request to `domain` failed or produced no usable
    /// content, possibly tripping the circuit open.
    pub fn record_failure(&self, domain: &str) {
        let state = self
            .circuits
            .entry(domain.to_string())
            .or_insert_with(|| Mutex::new(CircuitState::default()));
        let mut state = state.lock().unwrap();
        state.record_failure(self.config.circuit_failure_threshold);
        if state.is_open() {
            debug!(domain, "circuit opened after consecutive failures");
        }
    }
}
