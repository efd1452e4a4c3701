//! Capture persistence.
//!
//! # Responsibilities
//! - Append normalized captures, assigning id and receive time
//! - Return a session's captures newest first
//!
//! # Design Decisions
//! - Append-only: no update or delete operations exist
//! - `sessionId` is a grouping key, never unique
//! - An unknown session yields an empty list, not an error

pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use thiserror::Error;

use crate::capture::{CapturedRequest, NewCapture};
use crate::error::{InspectorError, InspectorResult};

pub use sqlite::SqliteStore;

/// Errors raised by a capture store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid timestamp in row {id}: {value}")]
    Timestamp { id: i64, value: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Append-only store of captured requests.
pub trait CaptureStore: Send + Sync {
    /// Persist `capture` and return the stored record.
    fn put(&self, capture: NewCapture) -> Result<CapturedRequest, StoreError>;

    /// All records for `session_id`, most recent first.
    fn query(&self, session_id: &str) -> Result<Vec<CapturedRequest>, StoreError>;
}

/// Run a store operation on the blocking pool.
pub async fn with_store<T, F>(store: &Arc<dyn CaptureStore>, f: F) -> InspectorResult<T>
where
    F: FnOnce(&dyn CaptureStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| InspectorError::Internal(format!("store task failed: {e}")))?
        .map_err(InspectorError::from)
}
