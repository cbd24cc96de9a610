//! Client identification utilities
//!
//! Derives the opaque identifier the rate limiter keys its counters on.
//!
//! Resolution order is a trust chain for a reverse-proxy deployment:
//! `X-Forwarded-For` (first hop), then `X-Real-IP`, then a
//! `User-Agent`/`Accept-Language` composite. Every one of these headers is
//! client-controlled, so the result is suitable for abuse damping only,
//! never for authentication.

use axum::http::{HeaderMap, header};

/// Upper bound on the fallback composite, in characters
pub const MAX_FALLBACK_IDENTIFIER_LEN: usize = 100;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";
const UNKNOWN: &str = "unknown";

/// Resolve the rate-limit identifier for a request
///
/// Never fails: a request without any identifying header gets the shared
/// `unknown-unknown` identifier.
pub fn resolve_client_identifier(headers: &HeaderMap) -> String {
    if let Some(ip) = forwarded_for(headers) {
        return ip.to_string();
    }

    if let Some(ip) = header_str(headers, X_REAL_IP) {
        return ip.to_string();
    }

    let user_agent = header_str(headers, header::USER_AGENT.as_str()).unwrap_or(UNKNOWN);
    let accept_language =
        header_str(headers, header::ACCEPT_LANGUAGE.as_str()).unwrap_or(UNKNOWN);

    format!("{}-{}", user_agent, accept_language)
        .chars()
        .take(MAX_FALLBACK_IDENTIFIER_LEN)
        .collect()
}

/// First entry of `X-Forwarded-For`, trimmed
fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, X_FORWARDED_FOR)?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|first| !first.is_empty())
}

/// Non-empty, trimmed, visible-ASCII header value
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static(" 192.168.1.1 , 10.0.0.1"),
        );
        headers.insert(X_REAL_IP, HeaderValue::from_static("10.9.9.9"));

        assert_eq!(resolve_client_identifier(&headers), "192.168.1.1");
    }

    #[test]
    fn test_empty_forwarded_for_falls_through_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(" , 10.0.0.1"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("10.9.9.9"));

        assert_eq!(resolve_client_identifier(&headers), "10.9.9.9");
    }

    #[test]
    fn test_fallback_composite() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        assert_eq!(resolve_client_identifier(&headers), "curl/8.0-en-US");
    }

    #[test]
    fn test_no_headers_gives_shared_identifier() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_client_identifier(&headers), "unknown-unknown");
    }

    #[test]
    fn test_fallback_is_truncated() {
        let long_agent = "A".repeat(300);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&long_agent).unwrap(),
        );

        let id = resolve_client_identifier(&headers);
        assert_eq!(id.chars().count(), MAX_FALLBACK_IDENTIFIER_LEN);
        assert!(id.chars().all(|c| c == 'A'));
    }
}
