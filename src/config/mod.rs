//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InspectorConfig (validated, immutable)
//!     → passed into each component constructor
//! ```
//!
//! # Design Decisions
//! - Config is built once at process start; handlers never read the environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::InspectorConfig;
pub use schema::{
    CaptureConfig, ListenerConfig, LogFormat, ObservabilityConfig, OutboundConfig,
    SecurityConfig, StorageConfig, TimeoutConfig,
};
