//! HTTP server setup and the dual-listener run loop.
//!
//! # Responsibilities
//! - Compose the request pipeline once, around the route table
//! - Serve the same pipeline on the plaintext and TLS listeners
//! - Observe the shutdown signal, drain, and report why the server stopped
//! - Surface a listener that dies on its own as a fatal error
//!
//! # Pipeline
//! ```text
//! listener tag → request logger → timeout → body limit → raw body → router
//! ```

use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware,
    response::Response,
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Span;

use crate::config::{LimitsConfig, ServerConfig};
use crate::http::request::buffer_body;
use crate::lifecycle::{Shutdown, ShutdownReason};
use crate::net::{BoundListeners, ListenerKind};
use crate::routing::fixture_routes;

/// Error type for a server that stopped without being asked to.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{listener} listener stopped unexpectedly")]
    Stopped { listener: ListenerKind },

    #[error("{listener} listener failed: {source}")]
    Failed {
        listener: ListenerKind,
        #[source]
        source: std::io::Error,
    },

    #[error("listener task aborted: {source}")]
    Aborted {
        #[source]
        source: JoinError,
    },
}

/// What a listener task returns when it ends.
type ListenerExit = (ListenerKind, std::io::Result<()>);

impl ServerError {
    fn from_exit(exit: Result<ListenerExit, JoinError>) -> Self {
        match exit {
            Ok((listener, Ok(()))) => ServerError::Stopped { listener },
            Ok((listener, Err(source))) => ServerError::Failed { listener, source },
            Err(source) => ServerError::Aborted { source },
        }
    }
}

/// The fixture server: one route table, two listeners.
pub struct FixtureServer {
    config: ServerConfig,
    tls: RustlsConfig,
    shutdown: Shutdown,
}

impl FixtureServer {
    /// Create a server. `shutdown` is the handle `/done` fires.
    pub fn new(config: ServerConfig, tls: RustlsConfig, shutdown: Shutdown) -> Self {
        Self {
            config,
            tls,
            shutdown,
        }
    }

    fn app_for(&self, kind: ListenerKind) -> Router {
        build_app(self.shutdown.clone(), &self.config.limits).layer(Extension(kind))
    }

    /// Serve both listeners until the shutdown signal fires.
    ///
    /// Once it fires, new connections are refused, in-flight responses are
    /// flushed, and stragglers get at most the drain deadline. Both listener
    /// sockets are closed by the time this returns.
    pub async fn run(self, listeners: BoundListeners) -> Result<ShutdownReason, ServerError> {
        let http_addr = listeners.http_addr();
        let https_addr = listeners.https_addr();
        let (http, https) = listeners.into_parts();
        let drain = self.config.limits.drain_timeout();

        let mut tasks: JoinSet<ListenerExit> = JoinSet::new();

        let http_app = self
            .app_for(ListenerKind::Http)
            .into_make_service_with_connect_info::<SocketAddr>();
        let mut http_stop = self.shutdown.subscribe();
        tasks.spawn(async move {
            let result = axum::serve(http, http_app)
                .with_graceful_shutdown(async move {
                    http_stop.recv().await;
                })
                .await;
            (ListenerKind::Http, result)
        });

        let handle = axum_server::Handle::new();
        let https_app = self
            .app_for(ListenerKind::Https)
            .into_make_service_with_connect_info::<SocketAddr>();
        let https_server =
            axum_server::from_tcp_rustls(https, self.tls.clone()).handle(handle.clone());
        tasks.spawn(async move { (ListenerKind::Https, https_server.serve(https_app).await) });

        tracing::info!(address = %http_addr, "hasty test server listening");
        tracing::info!(address = %https_addr, "hasty test tls server listening");

        // The plaintext server watches the same signal and may finish its
        // drain before this loop is polled, so the signal is checked first and
        // a listener exit after the trigger is part of a normal shutdown.
        let mut signal = self.shutdown.subscribe();
        let reason = tokio::select! {
            biased;
            reason = signal.recv() => reason,
            Some(exit) = tasks.join_next() => {
                if self.shutdown.is_triggered() {
                    signal.recv().await
                } else {
                    let e = ServerError::from_exit(exit);
                    tracing::error!(error = %e, "Listener failed, stopping server");
                    tasks.shutdown().await;
                    return Err(e);
                }
            }
        };

        tracing::info!(%reason, drain_ms = drain.as_millis() as u64, "Draining connections");
        handle.graceful_shutdown(Some(drain));

        let drained = tokio::time::timeout(drain, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Drain deadline passed, closing remaining connections");
        }
        // Aborts whatever is left and waits, so the sockets are gone on return.
        tasks.shutdown().await;

        tracing::info!("HTTP server stopped");
        Ok(reason)
    }
}

/// Build the request pipeline around the route table.
///
/// Later layers wrap earlier ones, so the logger sees every request first,
/// including those that end in a timeout, a 413 or a 404.
pub fn build_app(shutdown: Shutdown, limits: &LimitsConfig) -> Router {
    fixture_routes(shutdown)
        .layer(middleware::from_fn(buffer_body))
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            limits.request_timeout(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(log_request)
                .on_response(log_response),
        )
}

fn request_span(request: &Request) -> Span {
    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        listener = tracing::field::Empty,
        peer = tracing::field::Empty,
    );
    if let Some(kind) = request.extensions().get::<ListenerKind>() {
        span.record("listener", tracing::field::display(kind));
    }
    if let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        span.record("peer", tracing::field::display(peer));
    }
    span
}

fn log_request(_request: &Request, _span: &Span) {
    tracing::info!("request received");
}

fn log_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "response sent"
    );
}
