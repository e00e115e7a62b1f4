//! TLS identity loading.
//!
//! The identity is a PKCS#12 keystore (`.pfx`) bundling the private key and
//! its certificate chain, protected by a passphrase that may be empty.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use p12_keystore::KeyStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use thiserror::Error;

use crate::config::TlsConfig;

/// Error type for identity loading. Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("cannot read keystore {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed keystore, or the passphrase does not decrypt it.
    #[error("cannot decode keystore {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("keystore {path:?} holds no private key with a certificate chain")]
    MissingKey { path: PathBuf },

    #[error("keystore {path:?} rejected by TLS stack: {source}")]
    Tls {
        path: PathBuf,
        #[source]
        source: rustls::Error,
    },
}

/// Private key and certificate chain decoded from a keystore.
pub struct Identity {
    pub chain: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("chain_len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// Decode the keystore at `path` with `passphrase`.
pub fn read_identity(path: &Path, passphrase: &str) -> Result<Identity, IdentityError> {
    let der = std::fs::read(path).map_err(|source| IdentityError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let keystore = KeyStore::from_pkcs12(&der, passphrase).map_err(|e| IdentityError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let (alias, key_chain) = keystore
        .private_key_chain()
        .ok_or_else(|| IdentityError::MissingKey {
            path: path.to_path_buf(),
        })?;

    let chain: Vec<CertificateDer<'static>> = key_chain
        .chain()
        .iter()
        .map(|cert| CertificateDer::from(cert.as_der().to_vec()))
        .collect();
    if chain.is_empty() {
        return Err(IdentityError::MissingKey {
            path: path.to_path_buf(),
        });
    }

    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_chain.key().to_vec()));

    tracing::debug!(path = ?path, alias, certificates = chain.len(), "Keystore decoded");
    Ok(Identity { chain, key })
}

/// Build the TLS server configuration from an identity.
pub fn server_config(
    path: &Path,
    identity: Identity,
) -> Result<rustls::ServerConfig, IdentityError> {
    let mut config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(identity.chain, identity.key)
        .map_err(|source| IdentityError::Tls {
            path: path.to_path_buf(),
            source,
        })?;

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(config)
}

/// Load the configured keystore into a config axum-server can serve with.
pub fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, IdentityError> {
    let path = tls.identity_path.as_path();
    let identity = read_identity(path, &tls.passphrase)?;
    let config = server_config(path, identity)?;

    tracing::info!(path = ?path, "TLS identity loaded");
    Ok(RustlsConfig::from_config(Arc::new(config)))
}
