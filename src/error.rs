//! Error types shared by the REST client, the cart view and the CLI.

use thiserror::Error;

/// Failure talking to the back-office REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("{0}")]
    Transport(String),

    /// The bearer credential was refused. The session has already been purged.
    #[error("Session expired or not signed in, please sign in again")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("Invalid JSON from backend: {0}")]
    InvalidJson(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Failure of a cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Refused client-side; no request was sent.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CartError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Invalid configuration value read from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}
