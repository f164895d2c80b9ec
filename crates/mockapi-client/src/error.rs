//! Error types for Mock API Studio requests.
//!
//! Every failure falls into one of three categories: the request never
//! completed (transport), the service answered with a non-success status
//! (remote), or the answer could not be understood (decode). None of them
//! are retried by this crate.

use std::fmt;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, request construction or body read failure.
    Transport,
    /// The service responded with a status outside 200..300.
    Remote,
    /// The response body did not match the expected representation.
    Decode,
}

impl ErrorCategory {
    /// Whether this error category is worth retrying.
    ///
    /// Always false: callers treat every failure as terminal for the
    /// current operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "Transport failure",
            Self::Remote => "Remote request failed",
            Self::Decode => "Invalid response",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to Mock API Studio.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the response could not be read.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("API request failed: {status} {reason} - {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty if unknown.
        reason: String,
        /// Raw response body.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("invalid API response: {message}")]
    Decode {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::Remote { .. } => ErrorCategory::Remote,
            Error::Decode { .. } => ErrorCategory::Decode,
        }
    }

    /// HTTP status carried by a remote rejection.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported that the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether this error is worth retrying (never, see [`ErrorCategory`]).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Json(e) => Self::decode(e.to_string()),
            other => Self::transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}
