//! Configuration schema definitions.
//!
//! Defaults carry the fixed values the client test suite expects:
//! plaintext on 3000, TLS on 3001, identity in `./https.pfx` with an
//! empty passphrase.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Plaintext HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// TLS port.
pub const DEFAULT_HTTPS_PORT: u16 = 3001;

/// PKCS#12 keystore, relative to the working directory.
pub const DEFAULT_IDENTITY_PATH: &str = "https.pfx";

/// Root configuration for the fixture server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Listener addresses.
    pub listener: ListenerConfig,

    /// TLS identity material.
    pub tls: TlsConfig,

    /// Body size and timing limits.
    pub limits: LimitsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Address both listeners bind to.
    pub bind_address: IpAddr,

    /// Plaintext HTTP port.
    pub http_port: u16,

    /// TLS port.
    pub https_port: u16,
}

impl ListenerConfig {
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    pub fn https_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.https_port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
        }
    }
}

/// TLS identity: a PKCS#12 bundle holding the private key and certificate chain.
#[derive(Clone)]
pub struct TlsConfig {
    /// Path to the PKCS#12 keystore.
    pub identity_path: PathBuf,

    /// Keystore passphrase, possibly empty.
    pub passphrase: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            identity_path: PathBuf::from(DEFAULT_IDENTITY_PATH),
            passphrase: String::new(),
        }
    }
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("identity_path", &self.identity_path)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Engineering limits that keep a misbehaving client from pinning resources.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Largest request body buffered in memory.
    pub max_body_bytes: usize,

    /// Total time allowed for reading a request and producing its response.
    pub request_timeout_secs: u64,

    /// How long other connections may keep the process alive after `/done`.
    pub drain_timeout_ms: u64,
}

impl LimitsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024,
            request_timeout_secs: 30,
            drain_timeout_ms: 1_000,
        }
    }
}
