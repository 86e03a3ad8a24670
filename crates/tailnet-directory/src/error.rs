//! Error types for the directory client.

use thiserror::Error;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur when talking to the directory API.
///
/// A `404 Not Found` never shows up here for the delete/mutate family: those
/// calls treat a missing target as success. The list calls map it to an
/// empty collection.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The API answered with a non-success status.
    #[error("{operation}: HTTP {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The API rejected a creation because the target already exists.
    #[error("{operation}: conflict (HTTP 409): {body}")]
    Conflict { operation: &'static str, body: String },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were rejected or a token could not be acquired.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The API returned success but no usable payload.
    #[error("{0}: empty response")]
    EmptyResponse(&'static str),
}

impl DirectoryError {
    /// HTTP status reported by the remote, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Conflict { .. } => Some(409),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response body reported by the remote, when there was one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } | Self::Conflict { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the remote refused a creation as a duplicate.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether this is a network or HTTP-level failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Http(_) | Self::EmptyResponse(_))
    }
}
