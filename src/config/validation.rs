//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InspectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::InspectorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check every semantic rule and collect the failures.
pub fn validate_config(config: &InspectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field, message: String| errors.push(ValidationError { field, message });

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        fail(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        );
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path", "must not be empty".to_string());
    }

    if config.capture.fetch_flag.trim().is_empty() {
        fail("capture.fetch_flag", "must not be empty".to_string());
    }

    if config.proxy.connect_timeout_secs == 0 {
        fail("proxy.connect_timeout_secs", "must be greater than 0".to_string());
    }
    if config.proxy.read_timeout_secs == 0 {
        fail("proxy.read_timeout_secs", "must be greater than 0".to_string());
    }
    if let Some(public_url) = &config.proxy.public_url {
        match url::Url::parse(public_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
            _ => fail(
                "proxy.public_url",
                format!("'{public_url}' is not an absolute http(s) URL"),
            ),
        }
    }

    let relay_secs = config
        .proxy
        .connect_timeout_secs
        .saturating_add(config.proxy.read_timeout_secs);
    if config.timeouts.request_secs <= relay_secs {
        fail(
            "timeouts.request_secs",
            format!("must exceed the proxy connect + read timeouts ({relay_secs}s)"),
        );
    }

    if config.security.max_body_size == 0 {
        fail("security.max_body_size", "must be greater than 0".to_string());
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        fail(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&InspectorConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = InspectorConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.proxy.read_timeout_secs = 0;
        config.proxy.public_url = Some("ftp://example.com".into());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "proxy.read_timeout_secs",
                "proxy.public_url"
            ]
        );
    }

    #[test]
    fn test_request_deadline_must_cover_relay() {
        let mut config = InspectorConfig::default();
        config.timeouts.request_secs = 60;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "timeouts.request_secs");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = InspectorConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
