//! Exponential backoff with jitter (base 500ms, cap 8s, max 3 attempts).

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: Duration::from_millis(500),
            cap: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Full-jitter exponential backoff: `random(0, min(cap, base * 2^attempt))`.
    pub fn backoff_duration(&self, attempt: usize) -> Duration {
        let exp_ms = (self.base.as_millis() as f64) * 2f64.powi(attempt as i32);
        let capped_ms = exp_ms.min(self.cap.as_millis() as f64);
        let jittered_ms = fastrand::f64() * capped_ms;
        Duration::from_millis(jittered_ms.round() as u64)
    }

    /// Clamp a `Retry-After` value into the accepted [1s, 30s] window.
    pub fn clamp_retry_after(&self, requested: Duration) -> Duration {
        requested.clamp(Duration::from_secs(1), Duration::from_secs(30))
    }
}
