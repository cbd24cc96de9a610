//! Router assembly
//!
//! Every route group sits behind its own admission gate. Each gate owns a
//! separate limiter, so a client's health probes and reads are counted apart
//! from its cache flushes.

use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use platform::clock::Clock;
use platform::middleware::{RateLimitState, enforce_rate_limit};
use platform::rate_limit::{RateLimitPreset, RateLimiter};
use recommendation::presentation::router::{admin_routes, query_routes};
use recommendation::{RecommendationAppState, RecommendationSource};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

/// One limiter per preset, sharing a clock and sweep cadence
pub struct Gates {
    pub generous: RateLimitState,
    pub standard: RateLimitState,
    pub strict: RateLimitState,
}

impl Gates {
    pub fn new(clock: Arc<dyn Clock>, sweep_every: u64) -> Self {
        let gate = |preset: RateLimitPreset| {
            let limiter = RateLimiter::new(clock.clone()).with_sweep_every(sweep_every);
            RateLimitState::new(Arc::new(limiter), preset)
        };
        Self {
            generous: gate(RateLimitPreset::Generous),
            standard: gate(RateLimitPreset::Standard),
            strict: gate(RateLimitPreset::Strict),
        }
    }
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_router<S>(
    recommendations: RecommendationAppState<S>,
    gates: Gates,
    frontend_origins: &[String],
) -> Router
where
    S: RecommendationSource + Send + Sync + 'static,
{
    let allowed_origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route_layer(from_fn_with_state(gates.generous, enforce_rate_limit));

    let recommendation_routes = query_routes(recommendations.clone())
        .route_layer(from_fn_with_state(gates.standard, enforce_rate_limit))
        .merge(
            admin_routes(recommendations)
                .route_layer(from_fn_with_state(gates.strict, enforce_rate_limit)),
        );

    Router::new()
        .nest("/api", health_routes)
        .nest("/api/recommendations", recommendation_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
