//! In-memory Mock API Studio for tests.
//!
//! [`MockTransport`] implements just enough of the admin API for the
//! workspace, API definition and endpoint routes: it stores objects as JSON,
//! assigns sequential identifiers, checks the bearer token, records every
//! request, and can be primed with one-shot canned responses to simulate
//! failures.

use crate::error::Result;
use crate::transport::{Method, Request, Response, Transport};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Token the mock accepts unless configured otherwise.
pub const MOCK_TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
struct CannedResponse {
    method: Method,
    path_prefix: String,
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
struct MockState {
    token: String,
    workspaces: BTreeMap<String, Map<String, Value>>,
    apis: BTreeMap<String, Map<String, Value>>,
    endpoints: BTreeMap<String, Map<String, Value>>,
    next_workspace: u64,
    next_api: u64,
    next_endpoint: u64,
    requests: Vec<Request>,
    canned: Vec<CannedResponse>,
    lowercase_slugs: bool,
    omitted_fields: Vec<String>,
}

/// Mock transport backed by shared in-memory state.
///
/// Clones share the same state, so a test can keep one handle for
/// inspection while the client owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create an empty service accepting [`MOCK_TOKEN`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_token(MOCK_TOKEN)
    }

    /// Create an empty service accepting the given token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                token: token.into(),
                ..MockState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Answer the next request matching `method` and `path_prefix` with the
    /// given status and body instead of routing it.
    pub fn respond_once(
        &self,
        method: Method,
        path_prefix: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) {
        self.lock().canned.push(CannedResponse {
            method,
            path_prefix: path_prefix.into(),
            status,
            body: body.into(),
        });
    }

    /// Fail the next matching request with `status` and a JSON error body.
    pub fn fail_next(&self, method: Method, path_prefix: impl Into<String>, status: u16) {
        self.respond_once(
            method,
            path_prefix,
            status,
            json!({ "statusCode": status, "message": "injected failure" }).to_string(),
        );
    }

    /// Store slugs in lower case, the way the real service normalizes them.
    pub fn lowercase_slugs(&self, enabled: bool) {
        self.lock().lowercase_slugs = enabled;
    }

    /// Leave these fields out of every read response.
    pub fn omit_fields(&self, fields: &[&str]) {
        self.lock().omitted_fields = fields.iter().map(|f| (*f).to_string()).collect();
    }

    /// All requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Requests received for a given method.
    #[must_use]
    pub fn requests_for(&self, method: Method) -> Vec<Request> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Stored workspace, as the service holds it.
    #[must_use]
    pub fn workspace(&self, id: &str) -> Option<Value> {
        self.lock().workspaces.get(id).cloned().map(Value::Object)
    }

    /// Stored API definition.
    #[must_use]
    pub fn api(&self, id: &str) -> Option<Value> {
        self.lock().apis.get(id).cloned().map(Value::Object)
    }

    /// Stored endpoint.
    #[must_use]
    pub fn endpoint(&self, id: &str) -> Option<Value> {
        self.lock().endpoints.get(id).cloned().map(Value::Object)
    }

    /// Number of stored workspaces, APIs and endpoints.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        let state = self.lock();
        (
            state.workspaces.len(),
            state.apis.len(),
            state.endpoints.len(),
        )
    }

    /// Insert a workspace directly, bypassing the API.
    pub fn seed_workspace(&self, id: &str, name: &str, slug: &str, description: &str) {
        let mut record = Map::new();
        record.insert("id".into(), json!(id));
        record.insert("name".into(), json!(name));
        record.insert("slug".into(), json!(slug));
        record.insert("description".into(), json!(description));
        self.lock().workspaces.insert(id.to_string(), record);
    }

    /// Remove a workspace directly, simulating out-of-band deletion.
    pub fn remove_workspace(&self, id: &str) {
        self.lock().workspaces.remove(id);
    }

    /// Overwrite one field of a stored workspace, simulating drift.
    pub fn set_workspace_field(&self, id: &str, field: &str, value: Value) {
        if let Some(record) = self.lock().workspaces.get_mut(id) {
            record.insert(field.to_string(), value);
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if let Some(pos) = state
            .canned
            .iter()
            .position(|c| c.method == request.method && request.path.starts_with(&c.path_prefix))
        {
            let canned = state.canned.remove(pos);
            return Ok(response(canned.status, canned.body));
        }

        let expected = format!("Bearer {}", state.token);
        if request.header("Authorization") != Some(expected.as_str()) {
            return Ok(error(401, "missing or invalid bearer token"));
        }

        Ok(state.route(request))
    }
}

impl MockState {
    fn route(&mut self, request: &Request) -> Response {
        let segments: Vec<&str> = request
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let body = request.body.as_ref();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["admin", "workspaces"]) => self.create_workspace(body),
            (Method::Get, ["admin", "workspaces", id]) => {
                self.read(self.workspaces.get(*id), "workspace")
            }
            (Method::Put, ["admin", "workspaces", id]) => self.update_workspace(id, body),
            (Method::Delete, ["admin", "workspaces", id]) => self.delete_workspace(id),

            (Method::Post, ["admin", "api-definitions"]) => self.create_api(body),
            (Method::Get, ["admin", "api-definitions", id]) => {
                self.read(self.apis.get(*id), "api definition")
            }
            (Method::Delete, ["admin", "api-definitions", id]) => self.delete_api(id),

            (Method::Post, ["admin", "api-definitions", api_id, "endpoints"]) => {
                self.create_endpoint(api_id, body)
            }
            (Method::Get, ["admin", "api-definitions", api_id, "endpoints", id]) => {
                let found = self
                    .endpoints
                    .get(*id)
                    .filter(|e| e.get("apiId").and_then(Value::as_str) == Some(*api_id));
                self.read(found, "endpoint")
            }
            (Method::Delete, ["admin", "api-definitions", api_id, "endpoints", id]) => {
                let belongs = self
                    .endpoints
                    .get(*id)
                    .is_some_and(|e| e.get("apiId").and_then(Value::as_str) == Some(*api_id));
                if belongs {
                    self.endpoints.remove(*id);
                    response(200, String::new())
                } else {
                    error(404, "endpoint not found")
                }
            }

            _ => error(404, "route not found"),
        }
    }

    fn read(&self, record: Option<&Map<String, Value>>, what: &str) -> Response {
        match record {
            Some(record) => {
                let mut record = record.clone();
                for field in &self.omitted_fields {
                    record.remove(field);
                }
                ok_json(&Value::Object(record))
            }
            None => error(404, &format!("{what} not found")),
        }
    }

    fn normalize_slug(&self, slug: &str) -> String {
        if self.lowercase_slugs {
            slug.to_lowercase()
        } else {
            slug.to_string()
        }
    }

    fn create_workspace(&mut self, body: Option<&Value>) -> Response {
        let Some(body) = body.and_then(Value::as_object) else {
            return error(400, "body required");
        };
        let (Some(name), Some(slug)) = (str_field(body, "name"), str_field(body, "slug")) else {
            return error(400, "name and slug are required");
        };
        let slug = self.normalize_slug(slug);
        if self
            .workspaces
            .values()
            .any(|w| w.get("slug").and_then(Value::as_str) == Some(slug.as_str()))
        {
            return error(409, "workspace slug already exists");
        }

        self.next_workspace += 1;
        let id = format!("ws-{}", self.next_workspace);
        let mut record = Map::new();
        record.insert("id".into(), json!(id));
        record.insert("name".into(), json!(name));
        record.insert("slug".into(), json!(slug));
        record.insert(
            "description".into(),
            json!(str_field(body, "description").unwrap_or_default()),
        );
        self.workspaces.insert(id, record.clone());
        created(&Value::Object(record))
    }

    fn update_workspace(&mut self, id: &str, body: Option<&Value>) -> Response {
        let Some(body) = body.and_then(Value::as_object) else {
            return error(400, "body required");
        };
        let Some(record) = self.workspaces.get_mut(id) else {
            return error(404, "workspace not found");
        };
        for field in ["name", "description"] {
            if let Some(value) = body.get(field) {
                record.insert(field.to_string(), value.clone());
            }
        }
        ok_json(&Value::Object(record.clone()))
    }

    fn delete_workspace(&mut self, id: &str) -> Response {
        if self.workspaces.remove(id).is_none() {
            return error(404, "workspace not found");
        }
        let api_ids: Vec<String> = self
            .apis
            .iter()
            .filter(|(_, a)| a.get("workspaceId").and_then(Value::as_str) == Some(id))
            .map(|(k, _)| k.clone())
            .collect();
        for api_id in api_ids {
            self.remove_api_cascade(&api_id);
        }
        response(200, String::new())
    }

    fn create_api(&mut self, body: Option<&Value>) -> Response {
        let Some(body) = body.and_then(Value::as_object) else {
            return error(400, "body required");
        };
        let Some(workspace_id) = str_field(body, "workspaceId") else {
            return error(400, "workspaceId is required");
        };
        if !self.workspaces.contains_key(workspace_id) {
            return error(400, "workspace does not exist");
        }
        let (Some(name), Some(slug)) = (str_field(body, "name"), str_field(body, "slug")) else {
            return error(400, "name and slug are required");
        };
        let slug = self.normalize_slug(slug);

        self.next_api += 1;
        let id = format!("api-{}", self.next_api);
        let mut record = Map::new();
        record.insert("id".into(), json!(id));
        record.insert("workspaceId".into(), json!(workspace_id));
        record.insert("name".into(), json!(name));
        record.insert("slug".into(), json!(slug));
        record.insert(
            "version".into(),
            json!(str_field(body, "version").unwrap_or("1.0.0")),
        );
        record.insert(
            "description".into(),
            json!(str_field(body, "description").unwrap_or_default()),
        );
        self.apis.insert(id, record.clone());
        created(&Value::Object(record))
    }

    fn delete_api(&mut self, id: &str) -> Response {
        if !self.apis.contains_key(id) {
            return error(404, "api definition not found");
        }
        self.remove_api_cascade(id);
        response(200, String::new())
    }

    fn remove_api_cascade(&mut self, api_id: &str) {
        self.apis.remove(api_id);
        self.endpoints
            .retain(|_, e| e.get("apiId").and_then(Value::as_str) != Some(api_id));
    }

    fn create_endpoint(&mut self, api_id: &str, body: Option<&Value>) -> Response {
        if !self.apis.contains_key(api_id) {
            return error(404, "api definition not found");
        }
        let Some(body) = body.and_then(Value::as_object) else {
            return error(400, "body required");
        };
        let (Some(method), Some(path)) = (str_field(body, "method"), str_field(body, "path"))
        else {
            return error(400, "method and path are required");
        };

        self.next_endpoint += 1;
        let id = format!("ep-{}", self.next_endpoint);
        let mut record = Map::new();
        record.insert("id".into(), json!(id));
        record.insert("apiId".into(), json!(api_id));
        record.insert("method".into(), json!(method.to_uppercase()));
        record.insert("path".into(), json!(path));
        record.insert(
            "summary".into(),
            json!(str_field(body, "summary").unwrap_or_default()),
        );
        record.insert(
            "enabled".into(),
            body.get("enabled").cloned().unwrap_or(json!(true)),
        );
        record.insert(
            "responses".into(),
            body.get("responses").cloned().unwrap_or(json!([])),
        );
        self.endpoints.insert(id, record.clone());
        created(&Value::Object(record))
    }
}

fn str_field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

fn response(status: u16, body: String) -> Response {
    Response {
        status,
        reason: reason(status).to_string(),
        body,
    }
}

fn ok_json(value: &Value) -> Response {
    response(200, value.to_string())
}

fn created(value: &Value) -> Response {
    response(201, value.to_string())
}

fn error(status: u16, message: &str) -> Response {
    response(
        status,
        json!({ "statusCode": status, "message": message }).to_string(),
    )
}
