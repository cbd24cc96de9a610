//! Recommendation Source Trait
//!
//! The expensive computation the cache sits in front of. Implementations
//! live in the infrastructure layer (or outside this crate entirely).

use crate::domain::entities::Recommendation;
use crate::error::RecommendationResult;
use kernel::id::{LocationId, ProductId};

#[trait_variant::make(RecommendationSource: Send)]
pub trait LocalRecommendationSource {
    /// Compute recommendations for a set of products at one location
    ///
    /// `product_ids` is deduplicated and sorted.
    async fn recommend(
        &self,
        location_id: &LocationId,
        product_ids: &[ProductId],
    ) -> RecommendationResult<Vec<Recommendation>>;
}
