//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured `tracing` events, human-readable `fmt` output
//! - Diagnostics are best-effort and never influence a response

pub mod logging;
