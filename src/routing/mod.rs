//! Routing subsystem.
//!
//! # Design Decisions
//! - Exactly four routes, fixed at startup, immutable at runtime
//! - Exact path match, no prefixes, no trailing-slash folding
//! - Misses on path or method both end in the same empty 404

pub mod router;

pub use router::fixture_routes;
