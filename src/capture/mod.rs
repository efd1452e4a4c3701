//! Capture subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request on /{sessionId}
//!     → intent.rs (GET only: retrieve history or capture?)
//!     → normalizer.rs (body policy, headers, query, client IP)
//!     → record.rs (NewCapture)
//!     → store (append, assigns id + received_at)
//! ```

pub mod intent;
pub mod normalizer;
pub mod record;

pub use intent::{GetIntent, IntentRules};
pub use normalizer::{BodyPolicy, Normalizer, RawRequest};
pub use record::{CapturedRequest, HeaderBag, HeaderValue, NewCapture, QueryParams};
