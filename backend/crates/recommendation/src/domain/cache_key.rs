//! Canonical cache key
//!
//! Product IDs are sorted before joining, so any permutation of the same
//! input set maps to the same key.

use kernel::id::{LocationId, ProductId};

/// Prefix shared by every recommendation cache key
pub const CACHE_NAMESPACE: &str = "recommendations";

/// `recommendations:<location>:<sorted, comma-joined product ids>`
pub fn cache_key(location_id: &LocationId, product_ids: &[ProductId]) -> String {
    let mut ids: Vec<&str> = product_ids.iter().map(ProductId::as_str).collect();
    ids.sort_unstable();
    format!("{}:{}:{}", CACHE_NAMESPACE, location_id, ids.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ProductId> {
        raw.iter().map(|id| ProductId::new(*id)).collect()
    }

    #[test]
    fn test_permutations_collide() {
        let loc = LocationId::new("loc-1");
        assert_eq!(
            cache_key(&loc, &ids(&["b", "a"])),
            cache_key(&loc, &ids(&["a", "b"]))
        );
    }

    #[test]
    fn test_locations_do_not_collide() {
        let products = ids(&["a", "b"]);
        assert_ne!(
            cache_key(&LocationId::new("loc-1"), &products),
            cache_key(&LocationId::new("loc-2"), &products)
        );
    }

    #[test]
    fn test_format() {
        let key = cache_key(&LocationId::new("yard-7"), &ids(&["p2", "p10", "p1"]));
        assert_eq!(key, "recommendations:yard-7:p1,p10,p2");
    }
}
