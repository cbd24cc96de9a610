//! In-memory TTL cache for recommendation lists
//!
//! Expiry is enforced twice: lazily on every read (an expired entry is
//! never returned) and physically by [`RecommendationCache::purge_expired`],
//! which the background sweeper calls to keep the footprint bounded.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use kernel::id::{LocationId, ProductId};
use platform::clock::{Clock, deadline};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::cache_key::cache_key;
use crate::domain::entities::{Recommendation, RecommendationList};

struct CacheEntry {
    value: RecommendationList,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Cache counters, for observability only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Stored keys, including expired ones not yet purged
    pub key_count: usize,
    pub ttl_secs: u64,
}

/// TTL cache keyed by `(location, product set)`
///
/// Stored lists are shared, never copied: `get` returns the same
/// `Arc<[Recommendation]>` to every caller.
pub struct RecommendationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RecommendationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Canonical key for an input set (see [`cache_key`])
    pub fn key(location_id: &LocationId, product_ids: &[ProductId]) -> String {
        cache_key(location_id, product_ids)
    }

    /// Stored list for this input set, unless absent or expired
    pub fn get(
        &self,
        location_id: &LocationId,
        product_ids: &[ProductId],
    ) -> Option<RecommendationList> {
        let key = cache_key(location_id, product_ids);
        let now = self.clock.now();

        // The read guard is released at the end of this statement, before
        // any removal below.
        let found = self
            .entries
            .get(&key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone());

        match found {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Recommendation cache hit");
                Some(value)
            }
            None => {
                self.entries.remove_if(&key, |_, entry| entry.is_expired(now));
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Recommendation cache miss");
                None
            }
        }
    }

    /// Store `list`, replacing whatever was cached for this input set
    ///
    /// Returns the shared handle now held by the cache.
    pub fn set(
        &self,
        location_id: &LocationId,
        product_ids: &[ProductId],
        list: Vec<Recommendation>,
    ) -> RecommendationList {
        let key = cache_key(location_id, product_ids);
        let value: RecommendationList = list.into();
        let expires_at = deadline(self.clock.now(), self.ttl);

        self.entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                expires_at,
            },
        );
        value
    }

    /// Drop every entry
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        tracing::info!(dropped, "Recommendation cache cleared");
    }

    /// Physically remove expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            key_count: self.entries.len(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

impl fmt::Debug for RecommendationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationCache")
            .field("stats", &self.stats())
            .finish()
    }
}
