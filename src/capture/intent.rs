//! Read-or-write classification for `GET /{sessionId}`.
//!
//! The same URL and verb either returns the stored history (a dashboard
//! poll) or records the GET itself as a webhook event. A GET is a poll
//! only when it accepts JSON and either carries the fetch flag or has a
//! Referer mentioning the dashboard host. The signals are heuristics and
//! can misclassify: a third-party sender that asks for JSON and passes
//! the fetch flag is treated as a poll and its GET is not recorded.

use axum::http::{header, HeaderMap};

use crate::capture::record::QueryParams;

/// What a GET on a session endpoint should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetIntent {
    /// Return the session's stored history.
    Retrieve,
    /// Record the GET as a capture event.
    Capture,
}

/// Inputs to the classification.
#[derive(Debug, Clone)]
pub struct IntentRules {
    /// Query parameter that explicitly requests history.
    pub fetch_flag: String,
    /// Substring of the Referer identifying the dashboard.
    pub dashboard_host: String,
}

impl IntentRules {
    /// Classify a GET request.
    ///
    /// A JSON `Accept` is always required. Within that, the fetch flag set
    /// to `true` is the primary signal and a dashboard Referer the legacy one.
    pub fn classify(&self, headers: &HeaderMap, query: &QueryParams) -> GetIntent {
        let accepts_json = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("application/json"));
        if !accepts_json {
            return GetIntent::Capture;
        }

        let flagged = query.get(&self.fetch_flag).map(String::as_str) == Some("true");
        let from_dashboard = !self.dashboard_host.is_empty()
            && headers
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|referer| referer.contains(&self.dashboard_host));

        if flagged || from_dashboard {
            GetIntent::Retrieve
        } else {
            GetIntent::Capture
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn rules() -> IntentRules {
        IntentRules {
            fetch_flag: "fetch_payloads".into(),
            dashboard_host: "localhost:3000".into(),
        }
    }

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn accepting(accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(accept));
        headers
    }

    #[test]
    fn test_fetch_flag_with_json_accept_retrieves() {
        let intent = rules().classify(
            &accepting("application/json"),
            &query(&[("fetch_payloads", "true")]),
        );
        assert_eq!(intent, GetIntent::Retrieve);
    }

    #[test]
    fn test_fetch_flag_without_json_accept_is_a_capture() {
        let flag = query(&[("fetch_payloads", "true")]);
        assert_eq!(rules().classify(&HeaderMap::new(), &flag), GetIntent::Capture);
        assert_eq!(rules().classify(&accepting("text/html"), &flag), GetIntent::Capture);
    }

    #[test]
    fn test_fetch_flag_must_be_true() {
        let intent = rules().classify(
            &accepting("application/json"),
            &query(&[("fetch_payloads", "1")]),
        );
        assert_eq!(intent, GetIntent::Capture);
    }

    #[test]
    fn test_json_accept_alone_is_a_capture() {
        assert_eq!(
            rules().classify(&accepting("application/json"), &query(&[])),
            GetIntent::Capture
        );
    }

    #[test]
    fn test_dashboard_referer_matches_anywhere() {
        for referer in [
            "http://localhost:3000/dashboard",
            "https://localhost:3000/sessions/abc",
        ] {
            let mut headers = accepting("application/json, text/plain, */*");
            headers.insert(header::REFERER, HeaderValue::from_static(referer));
            assert_eq!(rules().classify(&headers, &query(&[])), GetIntent::Retrieve);
        }
    }

    #[test]
    fn test_dashboard_referer_without_json_accept_is_a_capture() {
        let mut headers = accepting("*/*");
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("http://localhost:3000/dashboard"),
        );
        assert_eq!(rules().classify(&headers, &query(&[])), GetIntent::Capture);
    }

    #[test]
    fn test_plain_get_is_a_capture() {
        assert_eq!(
            rules().classify(&HeaderMap::new(), &query(&[("foo", "bar")])),
            GetIntent::Capture
        );
    }
}
