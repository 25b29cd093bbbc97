//! Error types for the autodns agent
//!
//! This module defines all error types used throughout the crate.
//!
//! - [`Error`]: startup error, raised for invalid configuration
//! - [`QueryError`]: failures of the interface-address collaborator
//! - [`ReportError`]: failures of the reporter collaborator

use thiserror::Error;

/// Result type alias for autodns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the autodns agent
///
/// Per-tick collaborator failures are not part of it: they are
/// [`QueryError`] and [`ReportError`], absorbed by the reporting loop.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure of an interface address lookup
///
/// A query error never stops the reporting loop: the tick is skipped and
/// the agent state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The interface does not exist (or has no addresses at all)
    #[error("interface not found: {0}")]
    NotFound(String),

    /// The process is not allowed to read the address table
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The platform cannot enumerate addresses for this family/interface
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Failure of a single report attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Connection, TLS or transport level failure
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with anything other than HTTP 200
    #[error("server rejected report with status {status}: {body}")]
    ServerRejected {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated or empty)
        body: String,
    },

    /// The report did not complete within the configured timeout
    #[error("report timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The reporter failed in a way it did not classify (e.g. it panicked)
    #[error("unexpected reporter failure: {0}")]
    Unexpected(String),
}

impl ReportError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a server rejection error
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::ServerRejected {
            status,
            body: body.into(),
        }
    }

    /// Status code of a server rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
