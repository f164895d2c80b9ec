//! `mock_api_studio_workspace`: the top of the hierarchy, the only kind
//! that can be updated in place.

use super::remote_error;
use declarative::{Attribute, ResourceData, ResourceDefinition, Result, Schema};
use mockapi_client::{Client, NewWorkspace, WorkspaceUpdate};

pub const KIND: &str = "mock_api_studio_workspace";

pub fn definition() -> ResourceDefinition<Client> {
    ResourceDefinition {
        kind: KIND,
        description: "A workspace grouping API definitions",
        schema: Schema::new(vec![
            Attribute::string("name").required().describe("Display name"),
            Attribute::string("slug")
                .required()
                .immutable()
                .describe("URL-safe identifier, fixed at creation"),
            Attribute::string("description").default_value(""),
        ]),
        create,
        read,
        update: Some(update),
        delete,
    }
}

fn create(client: &Client, data: &mut ResourceData) -> Result<()> {
    let workspace = NewWorkspace {
        name: data.require_str("name")?.to_string(),
        slug: data.require_str("slug")?.to_string(),
        description: data.str_or_default("description"),
    };
    let id = client.create_workspace(&workspace).map_err(remote_error)?;
    data.set_id(id);
    Ok(())
}

fn read(client: &Client, data: &mut ResourceData) -> Result<()> {
    let workspace = client
        .get_workspace(data.require_id()?)
        .map_err(remote_error)?;
    data.set_opt("name", workspace.name);
    data.set_opt("slug", workspace.slug);
    data.set_opt("description", workspace.description);
    Ok(())
}

/// Sends every mutable attribute, not only the changed ones
fn update(client: &Client, data: &mut ResourceData) -> Result<()> {
    let update = WorkspaceUpdate {
        name: data.require_str("name")?.to_string(),
        description: data.str_or_default("description"),
    };
    client
        .update_workspace(data.require_id()?, &update)
        .map_err(remote_error)
}

fn delete(client: &Client, data: &ResourceData) -> Result<()> {
    client
        .delete_workspace(data.require_id()?)
        .map_err(remote_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{provider, testing};
    use declarative::{Address, AttrValue, Driver, attributes};
    use mockapi_client::Method;
    use serde_json::json;

    fn address() -> Address {
        Address::new(KIND, "team_a")
    }

    fn team_a() -> declarative::Attributes {
        attributes([
            ("name", AttrValue::from("Team A")),
            ("slug", "team-a".into()),
            ("description", "".into()),
        ])
    }

    #[test]
    fn test_create_then_read() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &team_a(), vec![]);
        assert!(outcome.diagnostics.is_empty());

        let state = outcome.state.unwrap();
        assert_eq!(state.id, "ws-1");
        assert_eq!(state.attributes, team_a());
        assert!(!state.tainted);

        let methods: Vec<_> = mock.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::Post, Method::Get]);
    }

    #[test]
    fn test_description_defaults_to_empty() {
        let provider = provider();
        let (client, _mock) = testing::client();
        let driver = Driver::new(&provider, &client);

        let desired = attributes([("name", AttrValue::from("Team A")), ("slug", "team-a".into())]);
        let state = driver.create(&address(), &desired, vec![]).state.unwrap();
        assert_eq!(state.attributes["description"], AttrValue::from(""));
    }

    #[test]
    fn test_read_captures_server_normalization() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.lowercase_slugs(true);
        let driver = Driver::new(&provider, &client);

        let desired = attributes([("name", AttrValue::from("Team A")), ("slug", "Team-A".into())]);
        let state = driver.create(&address(), &desired, vec![]).state.unwrap();
        assert_eq!(state.attributes["slug"], AttrValue::from("team-a"));
    }

    #[test]
    fn test_create_failure_sets_no_id() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.fail_next(Method::Post, "/admin/workspaces", 500);
        let driver = Driver::new(&provider, &client);

        let outcome = driver.create(&address(), &team_a(), vec![]);
        assert!(outcome.state.is_none());
        assert!(outcome.has_errors());
        assert_eq!(outcome.diagnostics[0].summary, "Remote request failed");
        assert_eq!(mock.counts(), (0, 0, 0));
    }

    #[test]
    fn test_update_sends_full_mutable_set() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        let mut desired = team_a();
        desired.insert("description".into(), "Payments team".into());
        let outcome = driver.update(&address(), &prior, &desired, vec![]);

        let state = outcome.state.unwrap();
        assert_eq!(state.id, prior.id);
        assert_eq!(state.attributes["description"], AttrValue::from("Payments team"));

        let puts = mock.requests_for(Method::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(
            puts[0].body,
            Some(json!({ "name": "Team A", "description": "Payments team" }))
        );
    }

    #[test]
    fn test_update_failure_keeps_prior_state() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        mock.fail_next(Method::Put, "/admin/workspaces/", 500);
        let mut desired = team_a();
        desired.insert("name".into(), "Team B".into());
        let outcome = driver.update(&address(), &prior, &desired, vec![]);

        assert!(outcome.has_errors());
        assert_eq!(outcome.state, Some(prior));
    }

    #[test]
    fn test_read_keeps_omitted_fields() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        mock.set_workspace_field("ws-1", "name", json!("Renamed"));
        mock.omit_fields(&["description"]);
        let state = driver.read(&address(), &prior).state.unwrap();
        assert_eq!(state.attributes["name"], AttrValue::from("Renamed"));
        assert_eq!(state.attributes["description"], AttrValue::from(""));
    }

    #[test]
    fn test_read_not_found_clears_state() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        mock.remove_workspace("ws-1");
        let outcome = driver.read(&address(), &prior);
        assert!(outcome.state.is_none());
        assert!(!outcome.has_errors());
    }

    #[test]
    fn test_delete() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        let outcome = driver.delete(&address(), &prior);
        assert!(outcome.state.is_none());
        assert!(mock.workspace("ws-1").is_none());
    }

    #[test]
    fn test_delete_failure_keeps_state() {
        let provider = provider();
        let (client, mock) = testing::client();
        let driver = Driver::new(&provider, &client);
        let prior = driver.create(&address(), &team_a(), vec![]).state.unwrap();

        mock.fail_next(Method::Delete, "/admin/workspaces/", 503);
        let outcome = driver.delete(&address(), &prior);
        assert!(outcome.has_errors());
        assert_eq!(outcome.state, Some(prior));
        assert!(mock.workspace("ws-1").is_some());
    }
}
