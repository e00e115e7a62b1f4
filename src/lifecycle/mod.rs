//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Trigger sources:
//!     GET /done        → Shutdown::trigger(Reason::Done)
//!     SIGINT / SIGTERM → Shutdown::trigger(Reason::Signal)
//!
//! Observer (http::server run loop):
//!     ShutdownSignal::recv → stop accepting → drain (bounded) → return reason
//! ```
//!
//! # Design Decisions
//! - One-shot: the first trigger wins, later triggers are ignored
//! - The handle is passed in at construction, never reached through a global
//! - Process exit happens in `main`, after the run loop has drained

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownReason, ShutdownSignal};
