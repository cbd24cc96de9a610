//! HTTP Handlers

use crate::application::config::RecommendationConfig;
use crate::application::get_recommendations::{GetRecommendationsInput, GetRecommendationsUseCase};
use crate::domain::source::RecommendationSource;
use crate::error::RecommendationResult;
use crate::infra::memory_cache::{CacheStats, RecommendationCache};
use crate::presentation::dto::{RecommendationRequest, RecommendationResponse};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

/// Shared state for recommendation handlers
pub struct RecommendationAppState<S>
where
    S: RecommendationSource + Send + Sync + 'static,
{
    pub source: Arc<S>,
    pub cache: Arc<RecommendationCache>,
    pub config: Arc<RecommendationConfig>,
}

// Manual impl: the source itself need not be Clone
impl<S> Clone for RecommendationAppState<S>
where
    S: RecommendationSource + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

/// POST /api/recommendations
pub async fn get_recommendations<S>(
    State(state): State<RecommendationAppState<S>>,
    Json(req): Json<RecommendationRequest>,
) -> RecommendationResult<Json<RecommendationResponse>>
where
    S: RecommendationSource + Send + Sync + 'static,
{
    let use_case = GetRecommendationsUseCase::new(
        state.source.clone(),
        state.cache.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(GetRecommendationsInput {
            location_id: req.location_id,
            product_ids: req.product_ids,
        })
        .await?;

    Ok(Json(RecommendationResponse {
        recommendations: output.recommendations,
        cached: output.cached,
    }))
}

/// GET /api/recommendations/cache/stats
pub async fn cache_stats<S>(State(state): State<RecommendationAppState<S>>) -> Json<CacheStats>
where
    S: RecommendationSource + Send + Sync + 'static,
{
    Json(state.cache.stats())
}

/// DELETE /api/recommendations/cache
pub async fn clear_cache<S>(State(state): State<RecommendationAppState<S>>) -> StatusCode
where
    S: RecommendationSource + Send + Sync + 'static,
{
    state.cache.clear();
    StatusCode::NO_CONTENT
}
