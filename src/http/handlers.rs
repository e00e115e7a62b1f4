//! Fixture route handlers.
//!
//! None of these can fail: they read only their own request and build only
//! their own response. `done` is the one handler with a side effect, it
//! fires the process-wide shutdown.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::http::request::RawBody;
use crate::http::response::EchoPayload;
use crate::lifecycle::{Shutdown, ShutdownReason};

/// `GET /done`: empty 200, then the server stops and the process exits 0.
///
/// The signal is only observed by the run loop, which lets this response
/// flush before it tears the listeners down.
pub async fn done(State(shutdown): State<Shutdown>) -> StatusCode {
    shutdown.trigger(ShutdownReason::Done);
    StatusCode::OK
}

/// `GET /basic_get`
pub async fn basic_get() -> &'static str {
    "success"
}

/// `POST /basic_post`: echo the headers and the body length.
pub async fn basic_post(headers: HeaderMap, body: RawBody) -> Json<EchoPayload> {
    tracing::info!(
        body = %String::from_utf8_lossy(&body.0),
        body_length = body.0.len(),
        "got a post"
    );
    Json(EchoPayload::new(&headers, body.0.len()))
}

/// `POST /basic_409`
pub async fn basic_409() -> StatusCode {
    StatusCode::CONFLICT
}

/// Anything else, including a known path with the wrong method.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
