//! Webhook inspector library.
//!
//! Captures arbitrary HTTP requests sent to per-session endpoints, serves
//! their history to a dashboard, and relays composer requests to
//! external URLs.

pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;
pub mod store;

pub use config::schema::InspectorConfig;
pub use error::{InspectorError, InspectorResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{CaptureStore, SqliteStore};
