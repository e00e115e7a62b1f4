//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! startup
//!     → tls.rs (decode PKCS#12 identity → rustls config)
//!     → listener.rs (bind plaintext + TLS ports)
//!     → hand both sockets to http::server
//! ```
//!
//! # Design Decisions
//! - Identity is loaded before any port is bound
//! - Both binds must succeed or nothing is served

pub mod listener;
pub mod tls;

pub use listener::{BoundListeners, ListenerError, ListenerKind};
pub use tls::{load_tls_config, IdentityError};
