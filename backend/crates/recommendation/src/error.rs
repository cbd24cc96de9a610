//! Recommendation Error Types
//!
//! Recommendation-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type RecommendationResult<T> = Result<T, RecommendationError>;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("locationId must not be empty")]
    MissingLocation,

    #[error("productIds must contain at least one product id")]
    NoProducts,

    #[error("productIds must not contain blank ids")]
    BlankProductId,

    #[error("At most {max} product ids may be requested at once, got {got}")]
    TooManyProducts { max: usize, got: usize },

    /// The computation behind the cache failed; nothing was cached
    #[error("Recommendation source failed: {0}")]
    Source(String),

    /// Affinity seed file could not be read
    #[error("Failed to read affinity seed: {0}")]
    SeedIo(#[from] std::io::Error),

    /// Affinity seed file is not a valid affinity table
    #[error("Invalid affinity seed: {0}")]
    SeedFormat(#[from] serde_json::Error),
}

impl RecommendationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecommendationError::MissingLocation
            | RecommendationError::NoProducts
            | RecommendationError::BlankProductId
            | RecommendationError::TooManyProducts { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RecommendationError::Source(_) => StatusCode::SERVICE_UNAVAILABLE,
            RecommendationError::SeedIo(_) | RecommendationError::SeedFormat(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendationError::MissingLocation
            | RecommendationError::NoProducts
            | RecommendationError::BlankProductId
            | RecommendationError::TooManyProducts { .. } => ErrorKind::UnprocessableEntity,
            RecommendationError::Source(_) => ErrorKind::ServiceUnavailable,
            RecommendationError::SeedIo(_) | RecommendationError::SeedFormat(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    fn log(&self) {
        match self {
            RecommendationError::Source(msg) => {
                tracing::error!(message = %msg, "Recommendation source error");
            }
            RecommendationError::SeedIo(e) => {
                tracing::error!(error = %e, "Affinity seed read error");
            }
            RecommendationError::SeedFormat(e) => {
                tracing::error!(error = %e, "Affinity seed format error");
            }
            _ => {
                tracing::debug!(error = %self, "Rejected recommendation request");
            }
        }
    }
}

impl From<RecommendationError> for AppError {
    fn from(err: RecommendationError) -> Self {
        let kind = err.kind();
        let app_err = AppError::new(kind, err.to_string());
        match err {
            RecommendationError::TooManyProducts { max, .. } => {
                app_err.with_action(format!("Request at most {} products", max))
            }
            RecommendationError::Source(_) => app_err.with_action("Try again shortly"),
            RecommendationError::SeedIo(e) => app_err.with_source(e),
            RecommendationError::SeedFormat(e) => app_err.with_source(e),
            _ => app_err,
        }
    }
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
