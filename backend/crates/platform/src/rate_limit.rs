//! Rate Limiting Infrastructure
//!
//! In-memory fixed-window admission gate keyed by client identifier.
//!
//! Each identifier owns one counter. The first request (or the first one
//! after the window has ended) opens a new window with `count = 1`; later
//! requests inside the window increment it, and once the count exceeds
//! `max_requests` the request is rejected until the window ends.
//!
//! Fixed windows admit up to `2 * max_requests` across a boundary (a full
//! quota at the end of one window, another at the start of the next).
//! Presets are tuned with that tolerance in mind.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::error::app_error::AppError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::client::resolve_client_identifier;
use crate::clock::{Clock, deadline};

/// Sweep cadence: expired records are purged on every Nth check
pub const DEFAULT_SWEEP_EVERY: u64 = 100;

/// Longest accepted window: one day
pub const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Custom identifier extraction, replacing [`resolve_client_identifier`]
pub type IdentifierFn = Arc<dyn Fn(&HeaderMap) -> String + Send + Sync>;

/// Invalid limiter configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitConfigError {
    #[error("max_requests must be greater than zero")]
    ZeroMaxRequests,

    #[error("window must be at least one second")]
    ZeroWindow,

    #[error("window must be at most {max} seconds, got {got}")]
    WindowTooLong { max: u64, got: u64 },
}

/// Rate limit configuration
///
/// Only constructible with a positive request quota and a window between
/// one second and [`MAX_WINDOW_SECS`].
#[derive(Clone)]
pub struct RateLimitConfig {
    max_requests: u32,
    window: Duration,
    identifier: Option<IdentifierFn>,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Result<Self, RateLimitConfigError> {
        if max_requests == 0 {
            return Err(RateLimitConfigError::ZeroMaxRequests);
        }
        if window_secs == 0 {
            return Err(RateLimitConfigError::ZeroWindow);
        }
        if window_secs > MAX_WINDOW_SECS {
            return Err(RateLimitConfigError::WindowTooLong {
                max: MAX_WINDOW_SECS,
                got: window_secs,
            });
        }
        Ok(Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            identifier: None,
        })
    }

    /// Key requests with `identifier` instead of the header trust chain
    pub fn with_identifier<F>(mut self, identifier: F) -> Self
    where
        F: Fn(&HeaderMap) -> String + Send + Sync + 'static,
    {
        self.identifier = Some(Arc::new(identifier));
        self
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Identifier the limiter will key this request on
    pub fn identify(&self, headers: &HeaderMap) -> String {
        match &self.identifier {
            Some(identifier) => identifier(headers),
            None => resolve_client_identifier(headers),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitPreset::Standard.config()
    }
}

impl fmt::Debug for RateLimitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitConfig")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("custom_identifier", &self.identifier.is_some())
            .finish()
    }
}

/// Named quotas for the common classes of endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPreset {
    /// Sign-in and password endpoints: 5 per minute
    Auth,
    /// Sensitive mutations: 10 per minute
    Strict,
    /// General API traffic: 100 per minute
    Standard,
    /// High-volume reads: 1000 per minute
    Generous,
}

impl RateLimitPreset {
    pub const fn max_requests(self) -> u32 {
        match self {
            RateLimitPreset::Auth => 5,
            RateLimitPreset::Strict => 10,
            RateLimitPreset::Standard => 100,
            RateLimitPreset::Generous => 1000,
        }
    }

    pub const fn window_secs(self) -> u64 {
        60
    }

    pub fn config(self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.max_requests(),
            window: Duration::from_secs(self.window_secs()),
            identifier: None,
        }
    }
}

impl From<RateLimitPreset> for RateLimitConfig {
    fn from(preset: RateLimitPreset) -> Self {
        preset.config()
    }
}

/// Per-identifier counter
#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitRecord {
    fn open(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: deadline(now, window),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitOutcome {
    pub limited: bool,
    pub remaining: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
    /// Present exactly when `limited` is true
    pub rejection: Option<RateLimitRejection>,
}

impl RateLimitOutcome {
    /// `X-RateLimit-*` headers describing this outcome
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        rate_limit_headers(self.limit, self.remaining, self.reset_at)
    }
}

/// A rejected request, ready to be returned to the client verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRejection {
    pub limit: u32,
    pub retry_after_secs: u64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitRejection {
    pub fn to_app_error(&self) -> AppError {
        AppError::too_many_requests("Too many requests, please try again later")
            .with_retry_after(self.retry_after_secs)
            .with_action(format!("Retry after {} seconds", self.retry_after_secs))
    }
}

impl IntoResponse for RateLimitRejection {
    fn into_response(self) -> Response {
        let mut response = self.to_app_error().into_response();
        let headers = response.headers_mut();
        for (name, value) in rate_limit_headers(self.limit, 0, self.reset_at) {
            headers.insert(name, value);
        }
        response
    }
}

fn rate_limit_headers(
    limit: u32,
    remaining: u32,
    reset_at: DateTime<Utc>,
) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (X_RATELIMIT_LIMIT, HeaderValue::from(limit)),
        (X_RATELIMIT_REMAINING, HeaderValue::from(remaining)),
    ];
    if let Ok(reset) = HeaderValue::from_str(&reset_at.to_rfc3339_opts(SecondsFormat::Millis, true))
    {
        headers.push((X_RATELIMIT_RESET, reset));
    }
    headers
}

/// In-memory fixed-window rate limiter
///
/// Shared by handlers through an `Arc`. The create-or-increment step runs
/// under the map's entry lock, so concurrent requests from one client
/// never lose an increment.
pub struct RateLimiter {
    records: DashMap<String, RateLimitRecord>,
    clock: Arc<dyn Clock>,
    sweep_every: u64,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
            sweep_every: DEFAULT_SWEEP_EVERY,
            checks: AtomicU64::new(0),
        }
    }

    /// Purge expired records on every `every`th check (minimum 1)
    pub fn with_sweep_every(mut self, every: u64) -> Self {
        self.sweep_every = every.max(1);
        self
    }

    /// Admit or reject a request, keyed by `config`'s identifier
    pub fn check(&self, headers: &HeaderMap, config: &RateLimitConfig) -> RateLimitOutcome {
        let identifier = config.identify(headers);
        self.check_key(&identifier, config)
    }

    /// Admit or reject a request from an already-resolved identifier
    pub fn check_key(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitOutcome {
        let now = self.clock.now();

        let record = match self.records.entry(identifier.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    *record = RateLimitRecord::open(now, config.window);
                } else {
                    record.count = record.count.saturating_add(1);
                }
                *record
            }
            Entry::Vacant(vacant) => *vacant.insert(RateLimitRecord::open(now, config.window)),
        };

        self.maybe_sweep(now);

        let limit = config.max_requests;
        if record.count > limit {
            let millis_left = (record.reset_at - now).num_milliseconds().max(0) as u64;
            let retry_after_secs = millis_left.div_ceil(1000);

            tracing::warn!(
                identifier = %identifier,
                count = record.count,
                limit,
                retry_after_secs,
                "Rate limit exceeded"
            );

            return RateLimitOutcome {
                limited: true,
                remaining: 0,
                limit,
                reset_at: record.reset_at,
                rejection: Some(RateLimitRejection {
                    limit,
                    retry_after_secs,
                    reset_at: record.reset_at,
                }),
            };
        }

        RateLimitOutcome {
            limited: false,
            remaining: limit - record.count,
            limit,
            reset_at: record.reset_at,
            rejection: None,
        }
    }

    /// Remove every record whose window has ended
    ///
    /// Returns the number of records removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(self.clock.now())
    }

    /// Number of identifiers currently holding a record, expired or not
    pub fn tracked_identifiers(&self) -> usize {
        self.records.len()
    }

    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let tick = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if tick % self.sweep_every == 0 {
            self.purge_expired_at(now);
        }
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        let removed = before.saturating_sub(self.records.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate limit records");
        }
        removed
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("tracked_identifiers", &self.records.len())
            .field("sweep_every", &self.sweep_every)
            .finish()
    }
}
