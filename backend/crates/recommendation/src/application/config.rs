//! Application Configuration
//!
//! Configuration for the recommendation application layer.

use std::time::Duration;

/// Longest accepted cache TTL and sweep interval: one week
pub const MAX_CACHE_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Recommendation application configuration
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// How long a computed list stays servable
    pub cache_ttl: Duration,
    /// Period of the background purge of expired entries
    pub sweep_interval: Duration,
    /// Upper bound on distinct product ids per request
    pub max_products_per_request: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            max_products_per_request: 50,
        }
    }
}
