//! Error types
//!
//! The snapshot core itself has no recoverable failure modes — every
//! operation is synchronous in-memory computation over validated inputs,
//! and malformed offsets are programming errors caught by assertions.
//! Errors only arise at the configuration surface.

use thiserror::Error;

/// Errors surfaced by the crate's configuration layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
