//! Affinity-table recommendation source
//!
//! Serves recommendations from a static table of "product X suggests Y"
//! rules, optionally scoped to a location. Loaded once at startup from a
//! JSON file:
//!
//! ```json
//! [
//!   {
//!     "locationId": "yard-north",
//!     "productId": "2x4-spf-8",
//!     "recommendations": [
//!       {
//!         "product": { "id": "nails-16d", "name": "16d Nails 5lb", "sku": "NL-16D-5", "price": 18.5 },
//!         "strength": 0.9,
//!         "reason": "frequently_bought_together"
//!       }
//!     ]
//!   }
//! ]
//! ```

use kernel::id::{LocationId, ProductId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::entities::Recommendation;
use crate::domain::source::RecommendationSource;
use crate::error::RecommendationResult;

/// One row of the affinity table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityRule {
    /// `None` applies the rule at every location
    #[serde(default)]
    pub location_id: Option<LocationId>,
    pub product_id: ProductId,
    pub recommendations: Vec<Recommendation>,
}

/// In-memory source backed by an affinity table
#[derive(Debug, Clone, Default)]
pub struct AffinityTableSource {
    rules: HashMap<ProductId, Vec<AffinityRule>>,
}

impl AffinityTableSource {
    pub fn new(rules: Vec<AffinityRule>) -> Self {
        let mut by_product: HashMap<ProductId, Vec<AffinityRule>> = HashMap::new();
        for rule in rules {
            by_product
                .entry(rule.product_id.clone())
                .or_default()
                .push(rule);
        }
        Self { rules: by_product }
    }

    pub fn from_json(json: &str) -> RecommendationResult<Self> {
        let rules: Vec<AffinityRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    pub async fn load(path: impl AsRef<Path>) -> RecommendationResult<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        let source = Self::from_json(&json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            products = source.rules.len(),
            "Loaded affinity table"
        );
        Ok(source)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Merge every matching rule, strongest first
    ///
    /// Products already in the input set are never suggested back, and a
    /// product suggested by several rules keeps its strongest entry.
    fn lookup(&self, location_id: &LocationId, product_ids: &[ProductId]) -> Vec<Recommendation> {
        let mut best: HashMap<&ProductId, &Recommendation> = HashMap::new();

        let matching = product_ids
            .iter()
            .filter_map(|id| self.rules.get(id))
            .flatten()
            .filter(|rule| {
                rule.location_id
                    .as_ref()
                    .is_none_or(|scoped| scoped == location_id)
            });

        for rule in matching {
            for rec in &rule.recommendations {
                if product_ids.contains(&rec.product.id) {
                    continue;
                }
                best.entry(&rec.product.id)
                    .and_modify(|current| {
                        if rec.strength > current.strength {
                            *current = rec;
                        }
                    })
                    .or_insert(rec);
            }
        }

        let mut merged: Vec<Recommendation> = best.into_values().cloned().collect();
        merged.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        merged
    }
}

impl RecommendationSource for AffinityTableSource {
    async fn recommend(
        &self,
        location_id: &LocationId,
        product_ids: &[ProductId],
    ) -> RecommendationResult<Vec<Recommendation>> {
        Ok(self.lookup(location_id, product_ids))
    }
}
