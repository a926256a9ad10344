//! Global per-profile in-flight caps, a bounded `tokio::sync::Semaphore`
//! per profile.

use mediascout_types::config::HttpProfile;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct ConcurrencyCaps {
    html: Arc<Semaphore>,
    api: Arc<Semaphore>,
    rss: Arc<Semaphore>,
}

impl ConcurrencyCaps {
    pub fn new(max_in_flight_per_profile: usize) -> Self {
        let permits = max_in_flight_per_profile.max(1);
        Self {
            html: Arc::new(Semaphore::new(permits)),
            api: Arc::new(Semaphore::new(permits)),
            rss: Arc::new(Semaphore::new(permits)),
        }
    }

    pub async fn acquire(&self, profile: HttpProfile) -> OwnedSemaphorePermit {
        let semaphore = match profile {
            HttpProfile::Html => &self.html,
            HttpProfile::Api => &self.api,
            HttpProfile::Rss => &self.rss,
        };
        semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let caps = ConcurrencyCaps::new(1);
        {
            let _permit = caps.acquire(HttpProfile::Html).await;
        }
        // The first permit was dropped, so a second acquire must not hang.
        let _permit = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            caps.acquire(HttpProfile::Html),
        )
        .await
        .expect("acquire should not block after release");
    }
}
