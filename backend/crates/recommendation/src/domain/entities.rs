//! Domain Entities
//!
//! Recommendation records as produced by a [`RecommendationSource`] and
//! stored by the cache.
//!
//! [`RecommendationSource`]: crate::domain::source::RecommendationSource

use kernel::id::ProductId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimal product projection shown next to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: f64,
}

/// Why a product was recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    /// Appears on the same orders as the input products
    FrequentlyBoughtTogether,
    /// Higher-grade alternative to an input product
    Upsell,
    /// Accessory or consumable for an input product
    CrossSell,
    /// Same product category
    SameCategory,
}

/// A single recommended product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product: ProductSummary,
    /// Relative confidence, higher is stronger
    pub strength: f64,
    pub reason: RecommendationReason,
}

/// Shared, read-only recommendation list
///
/// The cache hands the same allocation to every reader.
pub type RecommendationList = Arc<[Recommendation]>;
