//! `mock_api_studio_api`: an API definition inside a workspace. Every
//! attribute is fixed at creation, so any change replaces it.

use super::remote_error;
use crate::references::require_parent;
use declarative::{Attribute, ResourceData, ResourceDefinition, Result, Schema};
use mockapi_client::{Client, NewApi};

pub const KIND: &str = "mock_api_studio_api";

/// Version used when none is declared
pub const DEFAULT_VERSION: &str = "1.0.0";

pub fn definition() -> ResourceDefinition<Client> {
    ResourceDefinition {
        kind: KIND,
        description: "An API definition within a workspace",
        schema: Schema::new(vec![
            Attribute::string("workspace_id")
                .required()
                .immutable()
                .describe("Identifier of the parent workspace"),
            Attribute::string("name").required().immutable(),
            Attribute::string("slug").required().immutable(),
            Attribute::string("version")
                .immutable()
                .default_value(DEFAULT_VERSION),
            Attribute::string("description")
                .immutable()
                .default_value(""),
        ]),
        create,
        read,
        update: None,
        delete,
    }
}

fn create(client: &Client, data: &mut ResourceData) -> Result<()> {
    let workspace_id = require_parent(data, "workspace_id")?.to_string();
    let version = match data.str_or_default("version") {
        v if v.is_empty() => DEFAULT_VERSION.to_string(),
        v => v,
    };
    let api = NewApi {
        workspace_id,
        name: data.require_str("name")?.to_string(),
        slug: data.require_str("slug")?.to_string(),
        version,
        description: data.str_or_default("description"),
    };
    let id = client.create_api(&api).map_err(remote_error)?;
    data.set_id(id);
    Ok(())
}

fn read(client: &Client, data: &mut ResourceData) -> Result<()> {
    let api = client.get_api(data.require_id()?).map_err(remote_error)?;
    data.set_opt("workspace_id", api.workspace_id);
    data.set_opt("name", api.name);
    data.set_opt("slug", api.slug);
    data.set_opt("version", api.version);
    data.set_opt("description", api.description);
    Ok(())
}

fn delete(client: &Client, data: &ResourceData) -> Result<()> {
    client.delete_api(data.require_id()?).map_err(remote_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{provider, testing};
    use declarative::{Address, AttrValue, Attributes, Driver, attributes};
    use mockapi_client::Method;

    fn address() -> Address {
        Address::new(KIND, "orders")
    }

    fn orders(workspace_id: &str, version: &str) -> Attributes {
        attributes([
            ("workspace_id", AttrValue::from(workspace_id)),
            ("name", "Orders".into()),
            ("slug", "orders".into()),
            ("version", version.into()),
            ("description", "".into()),
        ])
    }

    #[test]
    fn test_empty_version_defaults() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.seed_workspace("ws-1", "Team A", "team-a", "");
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &orders("ws-1", ""), vec![]);
        let state = outcome.state.unwrap();
        assert_eq!(state.attributes["version"], AttrValue::from("1.0.0"));
        assert_eq!(state.attributes["workspace_id"], AttrValue::from("ws-1"));

        let post = &mock.requests_for(Method::Post)[0];
        let body = post.body.as_ref().unwrap();
        assert_eq!(body["workspaceId"], "ws-1");
        assert_eq!(body["version"], "1.0.0");
    }

    #[test]
    fn test_omitted_version_defaults() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.seed_workspace("ws-1", "Team A", "team-a", "");
        let driver = Driver::new(&provider, &client);

        let mut desired = orders("ws-1", "");
        desired.remove("version");
        desired.remove("description");
        let state = driver.create(&address(), &desired, vec![]).state.unwrap();
        assert_eq!(state.attributes["version"], AttrValue::from("1.0.0"));
        assert_eq!(state.attributes["description"], AttrValue::from(""));
    }

    #[test]
    fn test_missing_parent_makes_no_call() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &orders("", "2.0.0"), vec![]);
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics[0].summary, "Missing required attribute");
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_unknown_parent_surfaces_remote_rejection() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &orders("ws-404", "1.0.0"), vec![]);
        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics[0].summary, "Remote request failed");
        assert_eq!(mock.requests_for(Method::Post).len(), 1);
    }

    #[test]
    fn test_update_is_refused() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.seed_workspace("ws-1", "Team A", "team-a", "");
        let driver = Driver::new(&provider, &client);
        let prior = driver
            .create(&address(), &orders("ws-1", "1.0.0"), vec![])
            .state
            .unwrap();

        mock.clear_requests();
        let outcome = driver.update(&address(), &prior, &orders("ws-1", "2.0.0"), vec![]);
        assert!(outcome.has_errors());
        assert_eq!(outcome.state, Some(prior));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_delete_then_read_is_gone() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.seed_workspace("ws-1", "Team A", "team-a", "");
        let driver = Driver::new(&provider, &client);
        let prior = driver
            .create(&address(), &orders("ws-1", "1.0.0"), vec![])
            .state
            .unwrap();

        assert!(driver.delete(&address(), &prior).state.is_none());
        assert!(mock.api(&prior.id).is_none());
        assert!(driver.read(&address(), &prior).state.is_none());
    }
}
