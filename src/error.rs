//! Error types for the progress store
//!
//! Provides unified error handling using thiserror.

use std::fmt;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Remote Error Kind ==
/// Classification of a failed remote call, derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    Server,
    /// The request never produced a response (connect, DNS, reset)
    Transport,
    Other(u16),
}

impl RemoteErrorKind {
    /// Maps an HTTP status code onto a kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => RemoteErrorKind::BadRequest,
            401 => RemoteErrorKind::Unauthorized,
            403 => RemoteErrorKind::Forbidden,
            404 => RemoteErrorKind::NotFound,
            409 => RemoteErrorKind::Conflict,
            429 => RemoteErrorKind::RateLimited,
            500..=599 => RemoteErrorKind::Server,
            other => RemoteErrorKind::Other(other),
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::BadRequest => write!(f, "bad request"),
            RemoteErrorKind::Unauthorized => write!(f, "unauthorized"),
            RemoteErrorKind::Forbidden => write!(f, "forbidden"),
            RemoteErrorKind::NotFound => write!(f, "not found"),
            RemoteErrorKind::Conflict => write!(f, "conflict"),
            RemoteErrorKind::RateLimited => write!(f, "rate limited"),
            RemoteErrorKind::Server => write!(f, "server error"),
            RemoteErrorKind::Transport => write!(f, "transport failure"),
            RemoteErrorKind::Other(status) => write!(f, "HTTP {}", status),
        }
    }
}

// == Progress Error Enum ==
/// Unified error type for the progress store.
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Non-2xx response or transport failure from the progress service
    #[error("Remote {kind}: {message}")]
    Remote {
        kind: RemoteErrorKind,
        message: String,
    },

    /// The bounded wait elapsed before the remote call settled
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Cached payload could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProgressError {
    /// Builds a remote error from an HTTP status and message.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        ProgressError::Remote {
            kind: RemoteErrorKind::from_status(status),
            message: message.into(),
        }
    }

    /// Builds a transport-level remote error.
    pub fn transport(message: impl Into<String>) -> Self {
        ProgressError::Remote {
            kind: RemoteErrorKind::Transport,
            message: message.into(),
        }
    }

    /// Returns the remote kind, if this is a remote error.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            ProgressError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProgressError::Timeout(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProgressError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProgressError::Remote { kind, .. } => match kind {
                RemoteErrorKind::NotFound => StatusCode::NOT_FOUND,
                RemoteErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                RemoteErrorKind::Forbidden => StatusCode::FORBIDDEN,
                RemoteErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            ProgressError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProgressError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            ProgressError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProgressError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the progress store.
pub type Result<T> = std::result::Result<T, ProgressError>;
