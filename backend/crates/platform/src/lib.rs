//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Injectable clock
//! - Client identification for request keying
//! - Fixed-window rate limiting and its presets
//! - Admission middleware for axum routers

pub mod client;
pub mod clock;
pub mod middleware;
pub mod rate_limit;
