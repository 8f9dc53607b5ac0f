//! Error types for request dispatch.
//!
//! # Design
//! Every variant carries an owned, human-readable string so an error can be
//! cloned into each registered error handler independently. Errors are never
//! thrown from `resume()`; they travel exclusively through error handlers as
//! a failure outcome. A dispatch with no error handler fails silently — by
//! contract, not by accident — so register one whenever you care.

use std::fmt;

/// Errors delivered to error handlers when a dispatch fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The resolved URL could not be interpreted as a request target
    /// (missing or unsupported scheme, unparsable authority). No network
    /// attempt was made.
    InvalidUrl(String),

    /// The transport failed to deliver the request: connection refused,
    /// timeout, TLS failure, or an I/O error while reading the response.
    Transport(String),

    /// The request parameters could not be serialized into the configured
    /// encoding.
    Serialization(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidUrl(url) => write!(f, "invalid request URL: {url}"),
            ServiceError::Transport(msg) => write!(f, "transport failure: {msg}"),
            ServiceError::Serialization(msg) => {
                write!(f, "parameter serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ServiceError {}
