//! Get Recommendations Use Case
//!
//! Cache-aside lookup: serve from the cache when possible, otherwise ask
//! the source and store its answer.

use crate::application::config::RecommendationConfig;
use crate::domain::entities::RecommendationList;
use crate::domain::source::RecommendationSource;
use crate::error::{RecommendationError, RecommendationResult};
use crate::infra::memory_cache::RecommendationCache;
use kernel::id::{LocationId, ProductId};
use std::sync::Arc;

/// Input DTO for get recommendations
#[derive(Debug, Clone)]
pub struct GetRecommendationsInput {
    pub location_id: LocationId,
    pub product_ids: Vec<ProductId>,
}

/// Output DTO for get recommendations
#[derive(Debug, Clone)]
pub struct GetRecommendationsOutput {
    pub recommendations: RecommendationList,
    /// True when served from the cache without consulting the source
    pub cached: bool,
}

pub struct GetRecommendationsUseCase<S>
where
    S: RecommendationSource,
{
    source: Arc<S>,
    cache: Arc<RecommendationCache>,
    config: Arc<RecommendationConfig>,
}

impl<S> GetRecommendationsUseCase<S>
where
    S: RecommendationSource,
{
    pub fn new(
        source: Arc<S>,
        cache: Arc<RecommendationCache>,
        config: Arc<RecommendationConfig>,
    ) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: GetRecommendationsInput,
    ) -> RecommendationResult<GetRecommendationsOutput> {
        let product_ids = self.validate(&input)?;
        let location_id = input.location_id;

        if let Some(recommendations) = self.cache.get(&location_id, &product_ids) {
            return Ok(GetRecommendationsOutput {
                recommendations,
                cached: true,
            });
        }

        // Source failures propagate and leave the cache untouched
        let computed = self.source.recommend(&location_id, &product_ids).await?;

        tracing::info!(
            location_id = %location_id,
            products = product_ids.len(),
            recommendations = computed.len(),
            "Computed recommendations"
        );

        let recommendations = self.cache.set(&location_id, &product_ids, computed);

        Ok(GetRecommendationsOutput {
            recommendations,
            cached: false,
        })
    }

    /// Sorted, deduplicated product ids, or the first validation failure
    fn validate(&self, input: &GetRecommendationsInput) -> RecommendationResult<Vec<ProductId>> {
        if input.location_id.is_blank() {
            return Err(RecommendationError::MissingLocation);
        }
        if input.product_ids.is_empty() {
            return Err(RecommendationError::NoProducts);
        }
        if input.product_ids.iter().any(ProductId::is_blank) {
            return Err(RecommendationError::BlankProductId);
        }

        let mut product_ids = input.product_ids.clone();
        product_ids.sort();
        product_ids.dedup();

        let max = self.config.max_products_per_request;
        if product_ids.len() > max {
            return Err(RecommendationError::TooManyProducts {
                max,
                got: product_ids.len(),
            });
        }

        Ok(product_ids)
    }
}
