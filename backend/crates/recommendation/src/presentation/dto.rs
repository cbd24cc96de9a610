//! API DTOs (Data Transfer Objects)

use crate::domain::entities::RecommendationList;
use kernel::id::{LocationId, ProductId};
use serde::{Deserialize, Serialize};

/// Request for POST /api/recommendations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub location_id: LocationId,
    pub product_ids: Vec<ProductId>,
}

/// Response for POST /api/recommendations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: RecommendationList,
    pub cached: bool,
}
