//! Recommendation Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Recommendation entities, canonical cache key, source trait
//! - `application/` - Use cases
//! - `infra/` - TTL cache, background sweeper, affinity-table source
//! - `presentation/` - HTTP handlers
//!
//! ## Caching Model
//! - Keys are `recommendations:<location>:<sorted product ids>`, so the same
//!   product set in any order shares one entry
//! - Entries expire after a fixed TTL; expired entries are never served
//! - Lists are shared read-only (`Arc<[Recommendation]>`), never copied
//! - Invalidation is all-or-nothing (`clear`)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{MAX_CACHE_DURATION_SECS, RecommendationConfig};
pub use domain::cache_key::cache_key;
pub use domain::entities::{ProductSummary, Recommendation, RecommendationList, RecommendationReason};
pub use domain::source::RecommendationSource;
pub use error::{RecommendationError, RecommendationResult};
pub use infra::affinity_source::AffinityTableSource;
pub use infra::memory_cache::{CacheStats, RecommendationCache};
pub use infra::sweeper::spawn_cache_sweeper;
pub use presentation::handlers::RecommendationAppState;
pub use presentation::router::recommendation_router;
