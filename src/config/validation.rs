//! Configuration validation.
//!
//! # Responsibilities
//! - Reject listener pairs that would collide on one port
//! - Reject limits that would make every request fail
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Port 0 (ephemeral) is allowed on both listeners

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("plaintext and TLS listeners share port {0}")]
    DuplicatePort(u16),

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("body limit must be greater than zero")]
    ZeroBodyLimit,
}

/// Error returned for a configuration that failed validation.
#[derive(Debug, Error)]
#[error("invalid configuration: {}", join(.0))]
pub struct ConfigError(pub Vec<ValidationError>);

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a configuration before any listener is bound.
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.http_port != 0 && listener.http_port == listener.https_port {
        errors.push(ValidationError::DuplicatePort(listener.http_port));
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError(errors))
    }
}
