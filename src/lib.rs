//! Fixture HTTP/HTTPS server for the hasty client test suite.
//!
//! Serves four canned routes on a plaintext and a TLS listener:
//!
//! | Route | Method | Response |
//! |---|---|---|
//! | `/done` | GET | 200 empty, then the server stops |
//! | `/basic_get` | GET | 200 `success` |
//! | `/basic_post` | POST | 200 JSON `{"headers": {...}, "bodyLength": n}` |
//! | `/basic_409` | POST | 409 empty |

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::FixtureServer;
pub use lifecycle::Shutdown;
