//! Server configuration from environment variables

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use platform::rate_limit::DEFAULT_SWEEP_EVERY;
use recommendation::{MAX_CACHE_DURATION_SECS, RecommendationConfig};

const DEFAULT_PORT: u16 = 31113;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub recommendation: RecommendationConfig,
    pub rate_limit_sweep_every: u64,
    pub recommendation_seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RecommendationConfig::default();

        let port: u16 = parse_or(&lookup, "API_PORT", DEFAULT_PORT)?;
        let cache_ttl_secs = parse_or(
            &lookup,
            "RECOMMENDATION_CACHE_TTL_SECS",
            defaults.cache_ttl.as_secs(),
        )?;
        let sweep_secs = parse_or(
            &lookup,
            "RECOMMENDATION_CACHE_SWEEP_SECS",
            defaults.sweep_interval.as_secs(),
        )?;
        let rate_limit_sweep_every =
            parse_or(&lookup, "RATE_LIMIT_SWEEP_EVERY", DEFAULT_SWEEP_EVERY)?;

        anyhow::ensure!(
            (1..=MAX_CACHE_DURATION_SECS).contains(&cache_ttl_secs),
            "RECOMMENDATION_CACHE_TTL_SECS must be between 1 and {}",
            MAX_CACHE_DURATION_SECS
        );
        anyhow::ensure!(
            (1..=MAX_CACHE_DURATION_SECS).contains(&sweep_secs),
            "RECOMMENDATION_CACHE_SWEEP_SECS must be between 1 and {}",
            MAX_CACHE_DURATION_SECS
        );
        anyhow::ensure!(rate_limit_sweep_every > 0, "RATE_LIMIT_SWEEP_EVERY must be positive");

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            frontend_origins,
            recommendation: RecommendationConfig {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                sweep_interval: Duration::from_secs(sweep_secs),
                ..defaults
            },
            rate_limit_sweep_every,
            recommendation_seed_path: lookup("RECOMMENDATION_SEED_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr.port(), 31113);
        assert_eq!(config.frontend_origins.len(), 2);
        assert_eq!(config.recommendation.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.recommendation.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.rate_limit_sweep_every, 100);
        assert!(config.recommendation_seed_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("API_PORT", "8080"),
            ("FRONTEND_ORIGINS", "https://erp.pine.example, "),
            ("RECOMMENDATION_CACHE_TTL_SECS", "30"),
            ("RATE_LIMIT_SWEEP_EVERY", "10"),
            ("RECOMMENDATION_SEED_PATH", "/etc/pine/affinity.json"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.frontend_origins, vec!["https://erp.pine.example"]);
        assert_eq!(config.recommendation.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.rate_limit_sweep_every, 10);
        assert_eq!(
            config.recommendation_seed_path,
            Some(PathBuf::from("/etc/pine/affinity.json"))
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("API_PORT", "http")]).is_err());
        assert!(config(&[("RECOMMENDATION_CACHE_TTL_SECS", "0")]).is_err());
        assert!(config(&[("RATE_LIMIT_SWEEP_EVERY", "-1")]).is_err());
    }

    #[test]
    fn test_oversized_durations_fail() {
        let too_long = (MAX_CACHE_DURATION_SECS + 1).to_string();
        assert!(config(&[("RECOMMENDATION_CACHE_TTL_SECS", too_long.as_str())]).is_err());
        assert!(config(&[("RECOMMENDATION_CACHE_TTL_SECS", "18446744073709551615")]).is_err());
        assert!(config(&[("RECOMMENDATION_CACHE_SWEEP_SECS", too_long.as_str())]).is_err());

        let longest = MAX_CACHE_DURATION_SECS.to_string();
        let config = config(&[("RECOMMENDATION_CACHE_TTL_SECS", longest.as_str())]).unwrap();
        assert_eq!(
            config.recommendation.cache_ttl,
            Duration::from_secs(MAX_CACHE_DURATION_SECS)
        );
    }
}
