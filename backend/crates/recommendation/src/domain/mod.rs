//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Recommendation entities
//! - Canonical cache key derivation
//! - The recommendation source trait (interface)

pub mod cache_key;
pub mod entities;
pub mod source;
