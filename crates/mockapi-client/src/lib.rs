//! # mockapi-client
//!
//! Blocking client for the Mock API Studio admin API.
//!
//! This crate provides:
//! - One typed call per resource kind and verb (workspaces, API
//!   definitions, endpoints)
//! - A single error type separating transport, remote and decode failures
//! - A pluggable [`Transport`] with an HTTP implementation and an in-memory
//!   mock for tests
//!
//! ## Example
//!
//! ```no_run
//! use mockapi_client::{Client, ClientConfig, NewWorkspace};
//!
//! let client = Client::new(ClientConfig::new("http://localhost:3000", "token"));
//!
//! let id = client.create_workspace(&NewWorkspace {
//!     name: "Team A".to_string(),
//!     slug: "team-a".to_string(),
//!     description: String::new(),
//! })?;
//!
//! let workspace = client.get_workspace(&id)?;
//! println!("{:?}", workspace.name);
//! # Ok::<(), mockapi_client::Error>(())
//! ```
//!
//! No call is ever retried: each method performs exactly one round trip.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
#[allow(missing_docs)]
pub mod models;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_API_URL, Secret};
pub use error::{Error, ErrorCategory, Result};
pub use models::{
    ApiDefinition, Endpoint, EndpointResponse, NewApi, NewEndpoint, NewWorkspace,
    ResponseRecord, Workspace, WorkspaceUpdate,
};
pub use transport::{Method, MockTransport, Request, Response, Transport};

use models::Created;
use serde::Serialize;
use serde::de::DeserializeOwned;
use transport::http::HttpTransport;

const JSON_CONTENT_TYPE: &str = "application/json";

/// High-level client for the admin API.
///
/// The configuration is fixed at construction; the transport (and the HTTP
/// agent inside it) is reused for every call.
pub struct Client {
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client using the HTTP transport.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Box::new(HttpTransport::new()))
    }

    /// Create a client with a custom transport (useful for testing).
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// Create a workspace and return its identifier.
    pub fn create_workspace(&self, workspace: &NewWorkspace) -> Result<String> {
        self.create(Method::Post, "/admin/workspaces".to_string(), workspace)
    }

    /// Fetch a workspace.
    pub fn get_workspace(&self, id: &str) -> Result<Workspace> {
        self.get(format!("/admin/workspaces/{id}"))
    }

    /// Replace a workspace's mutable attributes.
    pub fn update_workspace(&self, id: &str, update: &WorkspaceUpdate) -> Result<()> {
        let body = request_body(update)?;
        self.execute(Method::Put, format!("/admin/workspaces/{id}"), Some(body))
            .map(drop)
    }

    /// Delete a workspace.
    pub fn delete_workspace(&self, id: &str) -> Result<()> {
        self.execute(Method::Delete, format!("/admin/workspaces/{id}"), None)
            .map(drop)
    }

    // =========================================================================
    // API definitions
    // =========================================================================

    /// Create an API definition and return its identifier.
    pub fn create_api(&self, api: &NewApi) -> Result<String> {
        self.create(Method::Post, "/admin/api-definitions".to_string(), api)
    }

    /// Fetch an API definition.
    pub fn get_api(&self, id: &str) -> Result<ApiDefinition> {
        self.get(format!("/admin/api-definitions/{id}"))
    }

    /// Delete an API definition.
    pub fn delete_api(&self, id: &str) -> Result<()> {
        self.execute(Method::Delete, format!("/admin/api-definitions/{id}"), None)
            .map(drop)
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Create an endpoint under an API definition and return its identifier.
    pub fn create_endpoint(&self, api_id: &str, endpoint: &NewEndpoint) -> Result<String> {
        self.create(
            Method::Post,
            format!("/admin/api-definitions/{api_id}/endpoints"),
            endpoint,
        )
    }

    /// Fetch an endpoint.
    pub fn get_endpoint(&self, api_id: &str, id: &str) -> Result<Endpoint> {
        self.get(format!("/admin/api-definitions/{api_id}/endpoints/{id}"))
    }

    /// Delete an endpoint.
    pub fn delete_endpoint(&self, api_id: &str, id: &str) -> Result<()> {
        self.execute(
            Method::Delete,
            format!("/admin/api-definitions/{api_id}/endpoints/{id}"),
            None,
        )
        .map(drop)
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn create<B: Serialize>(&self, method: Method, path: String, body: &B) -> Result<String> {
        let body = request_body(body)?;
        let text = self.execute(method, path, Some(body))?;
        let created: Created = serde_json::from_str(&text)?;
        created.into_id()
    }

    fn get<T: DeserializeOwned>(&self, path: String) -> Result<T> {
        let text = self.execute(Method::Get, path, None)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send one request and return the body of a successful response.
    fn execute(
        &self,
        method: Method,
        path: String,
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let request = Request {
            method,
            url: self.config.url(&path),
            headers: vec![
                ("Content-Type", JSON_CONTENT_TYPE.to_string()),
                ("Authorization", self.config.authorization()),
            ],
            path,
            body,
        };

        let response = self.transport.send(&request)?;
        log::debug!(
            "{} {} -> {} {}",
            request.method,
            request.path,
            response.status,
            response.reason
        );

        if !response.is_success() {
            return Err(Error::Remote {
                status: response.status,
                reason: response.reason,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}

/// Encode a request body; failing here means the request was never built
fn request_body<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| Error::transport(format!("failed to encode request body: {e}")))
}
