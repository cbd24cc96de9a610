//! Infrastructure Layer
//!
//! In-memory cache store, its background sweeper, and the affinity-table
//! recommendation source.

pub mod affinity_source;
pub mod memory_cache;
pub mod sweeper;
