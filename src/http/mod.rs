//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP / TLS connection (net)
//!     → server.rs (request logger, timeout, body limit)
//!     → request.rs (raw body capture)
//!     → routing::router (exact method + path dispatch)
//!     → handlers.rs (fixture responses, response.rs for the echo payload)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::RawBody;
pub use response::EchoPayload;
pub use server::{FixtureServer, ServerError};
