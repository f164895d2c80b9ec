//! Transport trait and implementations.
//!
//! The [`Client`](crate::Client) turns typed calls into [`Request`]s and
//! hands them to a [`Transport`]. [`http::HttpTransport`] sends them over
//! the network; [`MockTransport`] answers them from an in-memory copy of the
//! service so the whole stack can be tested offline:
//!
//! ```
//! use mockapi_client::{Client, ClientConfig, MockTransport, NewWorkspace};
//! use mockapi_client::transport::mock::MOCK_TOKEN;
//!
//! let mock = MockTransport::new();
//! let client = Client::with_transport(
//!     ClientConfig::new("http://mock", MOCK_TOKEN),
//!     Box::new(mock.clone()),
//! );
//!
//! let id = client
//!     .create_workspace(&NewWorkspace {
//!         name: "Team A".to_string(),
//!         slug: "team-a".to_string(),
//!         description: String::new(),
//!     })
//!     .unwrap();
//! assert_eq!(id, "ws-1");
//! assert_eq!(mock.requests().len(), 1);
//! ```

pub mod http;
pub mod mock;

pub use mock::MockTransport;

use crate::error::Result;
use std::fmt;

/// HTTP verbs used by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read an object.
    Get,
    /// Create an object.
    Post,
    /// Replace an object's mutable attributes.
    Put,
    /// Remove an object.
    Delete,
}

impl Method {
    /// Upper-case verb.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP verb.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Path relative to the service root, e.g. `/admin/workspaces/ws-1`.
    pub path: String,
    /// Header names and values, in send order.
    pub headers: Vec<(&'static str, String)>,
    /// JSON body, if the request carries one.
    pub body: Option<serde_json::Value>,
}

impl Request {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response. Non-success statuses are returned, not raised, so the
/// client can keep the body for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase, empty if the server sent none.
    pub reason: String,
    /// Raw response body.
    pub body: String,
}

impl Response {
    /// Whether the status is in `200..300`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can execute a [`Request`].
///
/// Implementations perform exactly one round trip per call and never retry.
pub trait Transport: Send + Sync {
    /// Send the request and return whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` when no response could be obtained.
    fn send(&self, request: &Request) -> Result<Response>;
}
