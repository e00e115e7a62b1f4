//! Listener binding for the plaintext and TLS ports.
//!
//! # Responsibilities
//! - Bind both configured ports before anything is served
//! - Surface a failure on either port as a fatal, port-specific error
//! - Hand the TLS socket over in the std form axum-server accepts

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {kind} listener on {addr}: {source}")]
    Bind {
        kind: ListenerKind,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Bound socket could not be inspected or converted.
    #[error("{kind} listener unusable: {source}")]
    Socket {
        kind: ListenerKind,
        #[source]
        source: std::io::Error,
    },
}

/// Which of the two listeners a socket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Http,
    Https,
}

impl std::fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerKind::Http => write!(f, "http"),
            ListenerKind::Https => write!(f, "https"),
        }
    }
}

/// Both listeners, bound and ready to serve.
#[derive(Debug)]
pub struct BoundListeners {
    /// Plaintext listener, served by `axum::serve`.
    http: TcpListener,
    /// TLS listener in non-blocking std form, served by axum-server.
    https: std::net::TcpListener,
    http_addr: SocketAddr,
    https_addr: SocketAddr,
}

impl BoundListeners {
    /// Bind the plaintext and TLS ports from the configuration.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let http = bind_one(ListenerKind::Http, config.http_addr()).await?;
        let https = bind_one(ListenerKind::Https, config.https_addr()).await?;
        Self::from_listeners(http, https)
    }

    fn from_listeners(http: TcpListener, https: TcpListener) -> Result<Self, ListenerError> {
        let http_addr = local_addr(ListenerKind::Http, &http)?;
        let https_addr = local_addr(ListenerKind::Https, &https)?;

        // Non-blocking mode is preserved by `into_std`.
        let https = https.into_std().map_err(|source| ListenerError::Socket {
            kind: ListenerKind::Https,
            source,
        })?;

        Ok(Self {
            http,
            https,
            http_addr,
            https_addr,
        })
    }

    /// Local address of the plaintext listener.
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Local address of the TLS listener.
    pub fn https_addr(&self) -> SocketAddr {
        self.https_addr
    }

    /// Split into the plaintext and TLS sockets.
    pub fn into_parts(self) -> (TcpListener, std::net::TcpListener) {
        (self.http, self.https)
    }
}

async fn bind_one(kind: ListenerKind, addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { kind, addr, source })?;

    tracing::debug!(listener = %kind, address = %addr, "Listener bound");
    Ok(listener)
}

fn local_addr(kind: ListenerKind, listener: &TcpListener) -> Result<SocketAddr, ListenerError> {
    listener
        .local_addr()
        .map_err(|source| ListenerError::Socket { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn loopback(http_port: u16, https_port: u16) -> ListenerConfig {
        ListenerConfig {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port,
            https_port,
        }
    }

    #[tokio::test]
    async fn binds_both_ephemeral_ports() {
        let bound = BoundListeners::bind(&loopback(0, 0)).await.unwrap();
        assert_ne!(bound.http_addr().port(), 0);
        assert_ne!(bound.https_addr().port(), 0);
        assert_ne!(bound.http_addr(), bound.https_addr());
    }

    #[tokio::test]
    async fn busy_http_port_is_fatal() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = BoundListeners::bind(&loopback(port, 0)).await.unwrap_err();
        match err {
            ListenerError::Bind { kind, addr, .. } => {
                assert_eq!(kind, ListenerKind::Http);
                assert_eq!(addr.port(), port);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn busy_https_port_is_fatal() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = BoundListeners::bind(&loopback(0, port)).await.unwrap_err();
        assert!(matches!(
            err,
            ListenerError::Bind { kind: ListenerKind::Https, .. }
        ));
        assert!(err.to_string().contains("https listener"));
    }
}
