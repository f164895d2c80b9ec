//! Request and response payloads for the admin API.
//!
//! Request types are complete: every field the service expects is always
//! sent. Response records use `Option` for every field so a payload that
//! omits an attribute decodes cleanly and callers can keep their previous
//! value instead.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Workspaces
// =============================================================================

/// Body of `POST /admin/workspaces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkspace {
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Body of `PUT /admin/workspaces/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceUpdate {
    pub name: String,
    pub description: String,
}

/// A workspace as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// API definitions
// =============================================================================

/// Body of `POST /admin/api-definitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApi {
    pub workspace_id: String,
    pub name: String,
    pub slug: String,
    pub version: String,
    pub description: String,
}

/// An API definition as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    pub id: Option<String>,
    pub workspace_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Endpoints
// =============================================================================

/// One canned response sent when creating an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub status: i64,
    pub body: String,
    pub is_default: bool,
}

/// Body of `POST /admin/api-definitions/{apiId}/endpoints`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEndpoint {
    pub method: String,
    pub path: String,
    pub summary: String,
    pub responses: Vec<EndpointResponse>,
    pub enabled: bool,
}

impl NewEndpoint {
    /// Build an enabled endpoint with a single default response.
    pub fn with_default_response(
        method: impl Into<String>,
        path: impl Into<String>,
        summary: impl Into<String>,
        status: i64,
        body: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            summary: summary.into(),
            responses: vec![EndpointResponse {
                status,
                body: body.into(),
                is_default: true,
            }],
            enabled: true,
        }
    }
}

/// A stored response as returned by the service.
///
/// The body is kept as raw JSON: the service may echo it back as a string
/// or as the parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: Option<i64>,
    pub body: Option<serde_json::Value>,
    pub is_default: Option<bool>,
}

impl ResponseRecord {
    /// Response body as text.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        match self.body.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// An endpoint as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: Option<String>,
    pub api_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub summary: Option<String>,
    pub enabled: Option<bool>,
    pub responses: Option<Vec<ResponseRecord>>,
}

impl Endpoint {
    /// The response flagged `isDefault`, if the service returned one.
    #[must_use]
    pub fn default_response(&self) -> Option<&ResponseRecord> {
        self.responses
            .as_deref()?
            .iter()
            .find(|r| r.is_default == Some(true))
    }
}

// =============================================================================
// Create responses
// =============================================================================

/// The part of a create response we rely on.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Created {
    id: Option<serde_json::Value>,
}

impl Created {
    /// Extract the assigned identifier.
    pub(crate) fn into_id(self) -> Result<String> {
        match self.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(Error::decode(format!(
                "create response has unusable id: {other}"
            ))),
            None => Err(Error::decode("create response is missing id")),
        }
    }
}
