//! Recommendation Router
//!
//! Split in two so the composition root can put a stricter admission gate
//! in front of the cache-flush route than in front of the reads.

use crate::domain::source::RecommendationSource;
use crate::presentation::handlers::{self, RecommendationAppState};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Lookup and stats routes
pub fn query_routes<S>(state: RecommendationAppState<S>) -> Router
where
    S: RecommendationSource + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(handlers::get_recommendations::<S>))
        .route("/cache/stats", get(handlers::cache_stats::<S>))
        .with_state(state)
}

/// Cache administration routes
pub fn admin_routes<S>(state: RecommendationAppState<S>) -> Router
where
    S: RecommendationSource + Send + Sync + 'static,
{
    Router::new()
        .route("/cache", delete(handlers::clear_cache::<S>))
        .with_state(state)
}

/// Every recommendation route, without admission gates
pub fn recommendation_router<S>(state: RecommendationAppState<S>) -> Router
where
    S: RecommendationSource + Send + Sync + 'static,
{
    query_routes(state.clone()).merge(admin_routes(state))
}
