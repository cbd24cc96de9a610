//! Background purge of expired cache entries

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::infra::memory_cache::RecommendationCache;

/// Purge expired entries from `cache` every `every`
///
/// The task runs until the returned handle is aborted.
pub fn spawn_cache_sweeper(cache: Arc<RecommendationCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired recommendation cache entries");
            }
        }
    })
}
