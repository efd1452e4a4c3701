//! Error taxonomy shared by the capture endpoint and the outbound proxy.
//!
//! # Design Decisions
//! - Validation errors are raised before any store write
//! - Each variant maps to exactly one HTTP status
//! - Rendering (capture `{error}` body vs proxy failure envelope) is
//!   chosen by the HTTP layer, not here

use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum InspectorError {
    /// The session identifier path segment was blank.
    #[error("UUID not provided")]
    MissingIdentifier,

    /// Body was not valid JSON where strict parsing is required.
    #[error("{0}")]
    InvalidPayload(String),

    /// Proxy request arrived without a body.
    #[error("Request body is required")]
    MissingBody,

    /// Proxy target is missing or not an absolute http(s) URL.
    #[error("Invalid URL format")]
    InvalidUrl,

    /// Outbound connect or read deadline elapsed.
    #[error("Request timeout")]
    Timeout,

    /// Transport-level failure talking to the outbound target.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Anything else that went wrong while relaying.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The capture store could not be reached or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl InspectorError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingIdentifier | Self::MissingBody | Self::InvalidUrl => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) | Self::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing_identifier",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::MissingBody => "missing_body",
            Self::InvalidUrl => "invalid_url",
            Self::Timeout => "timeout",
            Self::BadGateway(_) => "bad_gateway",
            Self::Internal(_) => "internal_error",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Result type for request handling.
pub type InspectorResult<T> = Result<T, InspectorError>;
