//! Outbound header policy.
//!
//! # Responsibilities
//! - Name the headers a relayed request may never carry
//! - Filter composer-supplied headers before they reach the wire
//!
//! # Design Decisions
//! - Mirrors the browser's forbidden request header list, so the relay
//!   cannot do what a script in the dashboard could not
//! - Comparison is case-insensitive; `proxy-*` and `sec-*` are denied by prefix

use crate::capture::HeaderBag;

/// Headers stripped from every outbound relayed request.
pub const UNSAFE_HEADERS: &[&str] = &[
    "accept-charset",
    "accept-encoding",
    "access-control-request-headers",
    "access-control-request-method",
    "connection",
    "content-length",
    "cookie",
    "cookie2",
    "date",
    "dnt",
    "expect",
    "host",
    "keep-alive",
    "origin",
    "referer",
    "set-cookie",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "via",
];

const UNSAFE_PREFIXES: &[&str] = &["proxy-", "sec-"];

/// Whether `name` must not be forwarded.
pub fn is_unsafe_header(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    UNSAFE_HEADERS.contains(&name.as_str())
        || UNSAFE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Drop unsafe headers and lowercase the remaining names.
pub fn filter_outbound(headers: &HeaderBag) -> HeaderBag {
    let mut safe = HeaderBag::new();
    for (name, value) in headers {
        if is_unsafe_header(name) {
            tracing::debug!(header = %name, "Dropping unsafe outbound header");
            continue;
        }
        let name = name.trim().to_ascii_lowercase();
        match safe.get_mut(&name) {
            Some(existing) => {
                for v in value.values() {
                    existing.push(v.to_string());
                }
            }
            None => {
                safe.insert(name, value.clone());
            }
        }
    }
    safe
}
