//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, routes)
//!     → request.rs (request ID, peer address)
//!     → capture.rs (/{sessionId}: record or retrieve)
//!       proxy.rs   (/proxy: composer relay)
//!       info.rs    (/, /up, 404 fallback)
//!     → response.rs (error rendering)
//!     → Send to client
//! ```

pub mod capture;
pub mod info;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{PeerAddr, RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
