//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: config, logging, store, listener
//! - In-flight outbound relays run to completion or their timeout

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
