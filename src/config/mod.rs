//! Server configuration.
//!
//! # Data Flow
//! ```text
//! ServerConfig::default() (fixed ports, fixed identity path)
//!     → CLI overrides (binary only)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - No config files: every value has a fixed default
//! - Validation is a pure function over the finished struct

pub mod schema;
pub mod validation;

pub use schema::{LimitsConfig, ListenerConfig, ServerConfig, TlsConfig};
pub use validation::{validate_config, ConfigError};
