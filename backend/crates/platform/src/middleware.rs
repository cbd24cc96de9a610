//! Rate limit admission middleware
//!
//! ```rust,ignore
//! let state = RateLimitState::new(limiter.clone(), RateLimitPreset::Strict);
//! let router = Router::new()
//!     .route("/orders", post(create_order))
//!     .route_layer(axum::middleware::from_fn_with_state(state, enforce_rate_limit));
//! ```

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::rate_limit::{RateLimitConfig, RateLimiter};

/// Middleware state: a shared limiter plus the quota for this route group
#[derive(Clone, Debug)]
pub struct RateLimitState {
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<RateLimitConfig>,
}

impl RateLimitState {
    pub fn new(limiter: Arc<RateLimiter>, config: impl Into<RateLimitConfig>) -> Self {
        Self {
            limiter,
            config: Arc::new(config.into()),
        }
    }
}

/// Rejects over-quota requests with 429 before they reach the handler
///
/// Admitted responses carry `X-RateLimit-Limit`, `X-RateLimit-Remaining`
/// and `X-RateLimit-Reset`.
pub async fn enforce_rate_limit(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let outcome = state.limiter.check(req.headers(), &state.config);

    if let Some(rejection) = outcome.rejection {
        return rejection.into_response();
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in outcome.headers() {
        headers.insert(name, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rate_limit::{RateLimitPreset, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING};
    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::get;
    use tower::ServiceExt;

    fn app(clock: &ManualClock, config: RateLimitConfig) -> Router {
        let limiter = Arc::new(RateLimiter::new(Arc::new(clock.clone())));
        let state = RateLimitState::new(limiter, config);
        Router::new()
            .route("/inventory", get(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                enforce_rate_limit,
            ))
    }

    fn request_from(ip: &'static str) -> Request<Body> {
        Request::builder()
            .uri("/inventory")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_admitted_requests_carry_quota_headers() {
        let clock = ManualClock::starting_now();
        let app = app(&clock, RateLimitPreset::Auth.into());

        let response = app.oneshot(request_from("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_RATELIMIT_LIMIT], "5");
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "4");
    }

    #[tokio::test]
    async fn test_sixth_request_is_rejected() {
        let clock = ManualClock::starting_now();
        let app = app(&clock, RateLimitConfig::new(5, 60).unwrap());

        for expected_remaining in ["4", "3", "2", "1", "0"] {
            let response = app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[X_RATELIMIT_REMAINING], expected_remaining);
        }

        let response = app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "0");

        // A different client is unaffected
        let response = app.oneshot(request_from("5.6.7.8")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejection_lifts_after_window() {
        let clock = ManualClock::starting_now();
        let app = app(&clock, RateLimitConfig::new(1, 60).unwrap());

        app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
        let response = app.clone().oneshot(request_from("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        clock.advance(chrono::Duration::seconds(61));
        let response = app.oneshot(request_from("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "0");
    }
}
