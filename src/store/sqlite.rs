//! SQLite-backed capture store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection};

use crate::capture::{CapturedRequest, HeaderBag, NewCapture, QueryParams};
use crate::store::{schema, CaptureStore, StoreError};

const SELECT_BY_SESSION: &str = "SELECT id, uuid, data, method, headers, ip_address, user_agent, \
     query_params, content_type, created_at, updated_at \
     FROM payloads WHERE uuid = ?1 ORDER BY created_at DESC, id DESC";

struct Inner {
    conn: Connection,
    /// Last receive time handed out; keeps `received_at` strictly increasing.
    last_received: Option<DateTime<Utc>>,
}

/// Capture store persisted in a single SQLite table.
pub struct SqliteStore {
    inner: Mutex<Inner>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = schema::open_and_migrate(path)?;
        tracing::info!(path = %path.display(), "Capture store opened");
        Ok(Self::from_connection(conn))
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(schema::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Mutex::new(Inner {
                conn,
                last_received: None,
            }),
        }
    }
}

impl Inner {
    fn next_received_at(&mut self) -> DateTime<Utc> {
        // Stored with microsecond precision, so hand out the same value.
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last_received {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_received = Some(now);
        now
    }
}

impl CaptureStore for SqliteStore {
    fn put(&self, capture: NewCapture) -> Result<CapturedRequest, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let received_at = inner.next_received_at();
        let stamp = received_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        let data = capture.body.as_ref().map(serde_json::to_string).transpose()?;
        let headers = serde_json::to_string(&capture.headers)?;
        let query_params = serde_json::to_string(&capture.query_params)?;

        inner.conn.execute(
            "INSERT INTO payloads (uuid, data, method, headers, ip_address, user_agent, \
             query_params, content_type, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                capture.session_id,
                data,
                capture.method,
                headers,
                capture.ip_address,
                capture.user_agent,
                query_params,
                capture.content_type,
                stamp,
            ],
        )?;
        let id = inner.conn.last_insert_rowid();

        tracing::debug!(id, session_id = %capture.session_id, method = %capture.method, "Capture stored");
        Ok(CapturedRequest::from_new(id, received_at, capture))
    }

    fn query(&self, session_id: &str) -> Result<Vec<CapturedRequest>, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = inner.conn.prepare_cached(SELECT_BY_SESSION)?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok(RawRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                data: row.get(2)?,
                method: row.get(3)?,
                headers: row.get(4)?,
                ip_address: row.get(5)?,
                user_agent: row.get(6)?,
                query_params: row.get(7)?,
                content_type: row.get(8)?,
                created_at: row.get(9)?,
                updated_at: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }
}

/// A row as read from SQLite, before JSON and timestamp decoding.
struct RawRow {
    id: i64,
    session_id: String,
    data: Option<String>,
    method: String,
    headers: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    query_params: String,
    content_type: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn decode(self) -> Result<CapturedRequest, StoreError> {
        let body: Option<serde_json::Value> =
            self.data.as_deref().map(serde_json::from_str).transpose()?;
        let headers: HeaderBag = serde_json::from_str(&self.headers)?;
        let query_params: QueryParams = serde_json::from_str(&self.query_params)?;

        Ok(CapturedRequest {
            id: self.id,
            received_at: parse_timestamp(self.id, &self.created_at)?,
            updated_at: parse_timestamp(self.id, &self.updated_at)?,
            session_id: self.session_id,
            body,
            method: self.method,
            headers,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            query_params,
            content_type: self.content_type,
        })
    }
}

fn parse_timestamp(id: i64, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp {
            id,
            value: value.to_string(),
        })
}
