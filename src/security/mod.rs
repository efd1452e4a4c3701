//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Composer request:
//!     → headers.rs (strip forbidden headers)
//!     → outbound client
//!
//! Browser request:
//!     → cors.rs (exact or wildcard origin match)
//! ```
//!
//! # Design Decisions
//! - One shared deny-list for every component that issues outbound requests
//! - Body size limits are enforced at the router (see http::server)

pub mod cors;
pub mod headers;
