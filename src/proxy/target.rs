//! Classification of relay targets relative to this service.

use url::Url;
use uuid::Uuid;

/// Decides whether a target URL points back at this service.
#[derive(Debug, Clone, Default)]
pub struct SelfTargetMatcher {
    /// Hosts configured as this service's public origin.
    configured_hosts: Vec<String>,
}

impl SelfTargetMatcher {
    pub fn new(public_url: Option<&str>) -> Self {
        let configured_hosts = public_url
            .and_then(|u| Url::parse(u).ok())
            .and_then(|u| u.host_str().map(normalize_host))
            .into_iter()
            .collect();
        Self { configured_hosts }
    }

    /// Whether `url` names this service's host.
    ///
    /// `request_host` is the `Host` header of the inbound `/proxy` call.
    /// Ports are ignored: the dashboard and the API may sit on
    /// different ports of the same host.
    pub fn is_own_host(&self, url: &Url, request_host: Option<&str>) -> bool {
        let Some(target) = url.host_str().map(normalize_host) else {
            return false;
        };
        let request_host = request_host.map(strip_port).map(normalize_host);

        request_host.as_deref() == Some(target.as_str())
            || self.configured_hosts.iter().any(|h| *h == target)
    }

    /// The session identifier when `url` targets this service's own
    /// capture endpoint, else `None`.
    pub fn capture_session(&self, url: &Url, request_host: Option<&str>) -> Option<String> {
        if !self.is_own_host(url, request_host) {
            return None;
        }
        session_from_path(url.path())
    }
}

/// Extract a session id from a `/{uuid}` path.
///
/// Only canonical hyphenated UUIDs match, which is the shape the dashboard
/// generates for its endpoints.
pub fn session_from_path(path: &str) -> Option<String> {
    let segment = path.strip_prefix('/')?;
    let segment = segment.strip_suffix('/').unwrap_or(segment);
    if segment.len() != 36 || segment.contains('/') {
        return None;
    }
    Uuid::try_parse(segment).ok().map(|_| segment.to_string())
}

/// Lowercase and drop IPv6 brackets, so `[::1]` and `::1` compare equal.
fn normalize_host(host: &str) -> String {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase()
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal, e.g. "[::1]:3001".
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}
