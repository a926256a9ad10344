//! Per-(domain, profile) token-bucket rate limiting, keyed rather than
//! global, and stored in a `dashmap` so limiters are created lazily per
//! domain without a global lock.

use dashmap::DashMap;
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use mediascout_types::config::HttpProfile;
use std::sync::Arc;
use std::time::Duration;

type KeyedLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

#[derive(Default)]
pub struct DomainRateLimiter {
    limiters: DashMap<(String, HttpProfile), Arc<KeyedLimiter>>,
}

impl DomainRateLimiter {
    /// Suspends the caller until a token is available for `(domain, profile)`,
    /// creating the bucket on first use at `rps`.
    pub async fn acquire(&self, domain: &str, profile: HttpProfile, rps: f64) {
        let key = (domain.to_string(), profile);
        let limiter = self
            .limiters
            .entry(key)
            .or_insert_with(|| Arc::new(new_limiter(rps)))
            .clone();
        limiter.until_ready().await;
    }
}

fn new_limiter(rps: f64) -> KeyedLimiter {
    // `Quota::per_second` only takes an integer burst size, which rounds
    // fractional rps (e.g. 1.5) up to the nearest whole number and
    // overshoots the configured rate. A period-based quota keeps
    // fractional rps exact.
    let period = Duration::from_secs_f64(1.0 / rps.max(0.01));
    let quota = Quota::with_period(period).unwrap();
    RateLimiter::direct(quota)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_without_blocking_under_quota() {
        let limiter = DomainRateLimiter::default();
        limiter.acquire("example.com", HttpProfile::Html, 10.0).await;
        limiter.acquire("example.com", HttpProfile::Html, 10.0).await;
    }

    #[tokio::test]
    async fn distinct_domains_get_distinct_buckets() {
        let limiter = DomainRateLimiter::default();
        limiter.acquire("a.com", HttpProfile::Api, 1.0).await;
        // A different domain must not be throttled by `a.com`'s bucket.
        let started = std::time::Instant::now();
        limiter.acquire("b.com", HttpProfile::Api, 1.0).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(200));
    }
}
