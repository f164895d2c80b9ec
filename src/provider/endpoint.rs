//! `mock_api_studio_endpoint`: a mocked route under an API definition.
//!
//! The response attributes are sent as a single response flagged
//! `isDefault`, and the endpoint is created enabled. Reads address the
//! endpoint through its parent, so `api_id` must be known for every call.

use super::remote_error;
use crate::references::require_parent;
use declarative::{Attribute, ResourceData, ResourceDefinition, Result, Schema};
use mockapi_client::{Client, NewEndpoint};

pub const KIND: &str = "mock_api_studio_endpoint";

pub const DEFAULT_STATUS: i64 = 200;
pub const DEFAULT_BODY: &str = "{}";

pub fn definition() -> ResourceDefinition<Client> {
    ResourceDefinition {
        kind: KIND,
        description: "A mocked endpoint of an API definition",
        schema: Schema::new(vec![
            Attribute::string("api_id")
                .required()
                .immutable()
                .describe("Identifier of the parent API definition"),
            Attribute::string("method").required().immutable(),
            Attribute::string("path").required().immutable(),
            Attribute::string("summary").immutable().default_value(""),
            Attribute::int("response_status")
                .immutable()
                .default_value(DEFAULT_STATUS)
                .describe("Status of the default response"),
            Attribute::string("response_body")
                .immutable()
                .default_value(DEFAULT_BODY)
                .describe("Body of the default response"),
        ]),
        create,
        read,
        update: None,
        delete,
    }
}

fn create(client: &Client, data: &mut ResourceData) -> Result<()> {
    let api_id = require_parent(data, "api_id")?.to_string();
    let body = match data.str_or_default("response_body") {
        b if b.is_empty() => DEFAULT_BODY.to_string(),
        b => b,
    };
    let endpoint = NewEndpoint::with_default_response(
        data.require_str("method")?,
        data.require_str("path")?,
        data.str_or_default("summary"),
        data.get_int("response_status").unwrap_or(DEFAULT_STATUS),
        body,
    );
    let id = client
        .create_endpoint(&api_id, &endpoint)
        .map_err(remote_error)?;
    data.set_id(id);
    Ok(())
}

fn read(client: &Client, data: &mut ResourceData) -> Result<()> {
    let api_id = require_parent(data, "api_id")?.to_string();
    let endpoint = client
        .get_endpoint(&api_id, data.require_id()?)
        .map_err(remote_error)?;

    data.set_opt("method", endpoint.method.clone());
    data.set_opt("path", endpoint.path.clone());
    data.set_opt("summary", endpoint.summary.clone());
    if let Some(response) = endpoint.default_response() {
        data.set_opt("response_status", response.status);
        data.set_opt("response_body", response.body_text());
    }
    Ok(())
}

fn delete(client: &Client, data: &ResourceData) -> Result<()> {
    let api_id = require_parent(data, "api_id")?;
    client
        .delete_endpoint(api_id, data.require_id()?)
        .map_err(remote_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{provider, testing};
    use declarative::{Address, AttrValue, Attributes, Driver, attributes};
    use mockapi_client::{Method, MockTransport, NewApi};
    use serde_json::json;

    fn address() -> Address {
        Address::new(KIND, "list_orders")
    }

    fn list_orders(api_id: &str) -> Attributes {
        attributes([
            ("api_id", AttrValue::from(api_id)),
            ("method", "GET".into()),
            ("path", "/orders".into()),
        ])
    }

    /// Workspace ws-1 with API api-1
    fn seeded(client: &Client, mock: &MockTransport) -> String {
        mock.seed_workspace("ws-1", "Team A", "team-a", "");
        let api_id = client
            .create_api(&NewApi {
                workspace_id: "ws-1".to_string(),
                name: "Orders".to_string(),
                slug: "orders".to_string(),
                version: "1.0.0".to_string(),
                description: String::new(),
            })
            .unwrap();
        mock.clear_requests();
        api_id
    }

    #[test]
    fn test_response_defaults() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        let driver = Driver::new(&provider, &client);

        let state = driver
            .create(&address(), &list_orders(&api_id), vec![])
            .state
            .unwrap();
        assert_eq!(state.attributes["response_status"], AttrValue::Int(200));
        assert_eq!(state.attributes["response_body"], AttrValue::from("{}"));
        assert_eq!(state.attributes["summary"], AttrValue::from(""));

        let stored = mock.endpoint(&state.id).unwrap();
        assert_eq!(stored["enabled"], json!(true));
        assert_eq!(stored["responses"][0]["isDefault"], json!(true));
        assert_eq!(stored["responses"][0]["status"], json!(200));
    }

    #[test]
    fn test_create_posts_under_parent() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        let driver = Driver::new(&provider, &client);

        let mut desired = list_orders(&api_id);
        desired.insert("response_status".into(), AttrValue::Int(201));
        desired.insert("response_body".into(), r#"{"ok":true}"#.into());
        let state = driver.create(&address(), &desired, vec![]).state.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].path, format!("/admin/api-definitions/{api_id}/endpoints"));
        assert_eq!(
            requests[1].path,
            format!("/admin/api-definitions/{api_id}/endpoints/{}", state.id)
        );
        assert_eq!(state.attributes["response_status"], AttrValue::Int(201));
        assert_eq!(state.attributes["response_body"], AttrValue::from(r#"{"ok":true}"#));
    }

    #[test]
    fn test_read_without_responses_keeps_values() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        let driver = Driver::new(&provider, &client);
        let prior = driver
            .create(&address(), &list_orders(&api_id), vec![])
            .state
            .unwrap();

        mock.omit_fields(&["responses", "summary"]);
        let state = driver.read(&address(), &prior).state.unwrap();
        assert_eq!(state.attributes, prior.attributes);
    }

    #[test]
    fn test_read_failure_after_create_taints() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        mock.fail_next(Method::Get, "/admin/api-definitions/", 500);
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &list_orders(&api_id), vec![]);
        let state = outcome.state.as_ref().unwrap();
        assert!(state.tainted);
        assert_eq!(state.id, "ep-1");
        assert_eq!(outcome.diagnostics[0].summary, "Read after create failed");
    }

    #[test]
    fn test_delete_addresses_parent() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        let driver = Driver::new(&provider, &client);
        let prior = driver
            .create(&address(), &list_orders(&api_id), vec![])
            .state
            .unwrap();

        mock.clear_requests();
        assert!(driver.delete(&address(), &prior).state.is_none());
        let deletes = mock.requests_for(Method::Delete);
        assert_eq!(
            deletes[0].path,
            format!("/admin/api-definitions/{api_id}/endpoints/{}", prior.id)
        );
        assert_eq!(mock.counts().2, 0);
    }

    #[test]
    fn test_delete_of_missing_endpoint_fails() {
        let provider = provider();
        let (client, mock) = testing::client();
        let api_id = seeded(&client, &mock);
        let driver = Driver::new(&provider, &client);
        let mut prior = driver
            .create(&address(), &list_orders(&api_id), vec![])
            .state
            .unwrap();
        prior.id = "ep-404".to_string();

        let outcome = driver.delete(&address(), &prior);
        assert!(outcome.has_errors());
        assert_eq!(outcome.state, Some(prior));
    }
}
