//! Cross-origin policy for the dashboard.
//!
//! Entries in `security.cors_origins` are exact origins
//! (`http://localhost:3000`) or patterns with a single `*`
//! (`https://*.neetodeployapp.com`). An empty list allows any origin.

use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::SecurityConfig;
use crate::http::request::X_REQUEST_ID;

/// Whether `origin` is allowed by `pattern`.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            origin.len() > prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
        None => pattern.eq_ignore_ascii_case(origin),
    }
}

/// Build the CORS layer for the configured origins.
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origin = if security.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let patterns = security.cors_origins.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .is_ok_and(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
        })
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers(Any)
        .expose_headers([X_REQUEST_ID])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_origin() {
        assert!(origin_matches("http://localhost:3000", "http://localhost:3000"));
        assert!(!origin_matches("http://localhost:3000", "http://localhost:3001"));
    }

    #[test]
    fn test_wildcard_origin() {
        let pattern = "https://*.neetodeployapp.com";
        assert!(origin_matches(pattern, "https://webhooks.neetodeployapp.com"));
        assert!(!origin_matches(pattern, "http://webhooks.neetodeployapp.com"));
        assert!(!origin_matches(pattern, "https://.neetodeployapp.com"));
        assert!(!origin_matches(pattern, "https://evil.example.com"));
    }
}
