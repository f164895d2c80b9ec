//! Host engine - plans a manifest against tracked state and executes it
//!
//! - `planner`: declared resources, dependency order, diffs
//! - `differ`: plan display
//! - `executor`: progress, confirmation and summary around
//!   [`declarative::execute`]

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{PromptConfirm, RunOptions, run};
pub use planner::{Declared, Planned, build_plan};

use declarative::{Address, Attributes, DataOutcome, Diagnostic, Driver, StateMap};
use std::collections::BTreeMap;

use crate::references;

/// Read every tracked instance again.
///
/// Instances that no longer exist are dropped with a warning; other read
/// failures keep the instance as it was.
pub fn refresh<C>(driver: &Driver<'_, C>, state: &mut StateMap) -> Vec<Diagnostic> {
    let addresses: Vec<Address> = state.keys().cloned().collect();
    let mut diagnostics = Vec::new();

    for address in addresses {
        let Some(instance) = state.get(&address).cloned() else {
            continue;
        };
        let outcome = driver.read(&address, &instance);
        match outcome.state {
            Some(refreshed) => {
                state.insert(address, refreshed);
            }
            None => {
                state.remove(&address);
            }
        }
        diagnostics.extend(outcome.diagnostics);
    }

    diagnostics
}

/// Read declared data sources, substituting references from `state`
pub fn read_data_sources<C>(
    driver: &Driver<'_, C>,
    declared: &BTreeMap<Address, Attributes>,
    state: &StateMap,
) -> Vec<(Address, DataOutcome)> {
    declared
        .iter()
        .map(|(address, config)| {
            let outcome = match references::resolve(config, state) {
                Ok(resolved) if resolved.unknown.is_empty() => {
                    driver.read_data_source(address, &resolved.attributes)
                }
                Ok(resolved) => DataOutcome {
                    id: None,
                    attributes: resolved.attributes,
                    diagnostics: vec![
                        Diagnostic::warning(
                            "Data source read deferred",
                            "its arguments depend on instances that are not created yet",
                        )
                        .with_address(address),
                    ],
                },
                Err(e) => DataOutcome {
                    id: None,
                    attributes: config.clone(),
                    diagnostics: vec![
                        Diagnostic::error("Invalid reference", e.to_string()).with_address(address),
                    ],
                },
            };
            (address.clone(), outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Manifest;
    use crate::provider::{api, endpoint, provider, testing, webhook, workspace};
    use declarative::{
        Action, ApplyResult, AttrValue, AutoConfirm, ExecuteOptions, ExecuteReport, NoProgress,
        Provider, Severity, execute,
    };
    use mockapi_client::{Client, Method};

    const CHAIN: &str = r#"
[resource.mock_api_studio_workspace.team_a]
name = "Team A"
slug = "team-a"
description = ""

[resource.mock_api_studio_api.orders]
workspace_id = "${mock_api_studio_workspace.team_a.id}"
name = "Orders"
slug = "orders"
version = ""

[resource.mock_api_studio_endpoint.list]
api_id = "${mock_api_studio_api.orders.id}"
method = "GET"
path = "/orders"
"#;

    const WORKSPACE: &str = r#"
[resource.mock_api_studio_workspace.team_a]
name = "Team A"
slug = "team-a"
description = ""
"#;

    fn apply(
        provider: &Provider<Client>,
        client: &Client,
        manifest: &str,
        state: &mut StateMap,
    ) -> ExecuteReport {
        apply_targeted(provider, client, manifest, None, state)
    }

    fn apply_targeted(
        provider: &Provider<Client>,
        client: &Client,
        manifest: &str,
        target: Option<&str>,
        state: &mut StateMap,
    ) -> ExecuteReport {
        let manifest = Manifest::parse(manifest).unwrap();
        let declared = Declared::new(manifest.resources());
        let planned = build_plan(provider, &declared, state)
            .unwrap()
            .targeted(target);
        let driver = Driver::new(provider, client);
        execute(
            &driver,
            &planned.plan,
            &ExecuteOptions::default(),
            &declared,
            state,
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap()
    }

    fn plan(provider: &Provider<Client>, manifest: &str, state: &StateMap) -> Planned {
        let manifest = Manifest::parse(manifest).unwrap();
        build_plan(provider, &Declared::new(manifest.resources()), state).unwrap()
    }

    fn ws() -> Address {
        Address::new(workspace::KIND, "team_a")
    }

    fn orders() -> Address {
        Address::new(api::KIND, "orders")
    }

    fn list() -> Address {
        Address::new(endpoint::KIND, "list")
    }

    #[test]
    fn test_workspace_scenario() {
        let provider = provider();
        let (client, _mock) = testing::client();
        let mut state = StateMap::new();

        let report = apply(&provider, &client, WORKSPACE, &mut state);
        assert_eq!(report.summary.created, 1);

        let tracked = &state[&ws()];
        assert_eq!(tracked.id, "ws-1");
        assert_eq!(tracked.attributes["name"], AttrValue::from("Team A"));
        assert_eq!(tracked.attributes["slug"], AttrValue::from("team-a"));
        assert_eq!(tracked.attributes["description"], AttrValue::from(""));
    }

    #[test]
    fn test_chain_is_created_parent_first_and_converges() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();

        let report = apply(&provider, &client, CHAIN, &mut state);
        assert!(report.summary.is_success());
        assert_eq!(report.summary.created, 3);
        assert_eq!(mock.counts(), (1, 1, 1));

        let api_post = &mock.requests_for(Method::Post)[1];
        assert_eq!(api_post.body.as_ref().unwrap()["workspaceId"], "ws-1");
        assert_eq!(state[&orders()].attributes["version"], AttrValue::from("1.0.0"));
        assert_eq!(state[&orders()].dependencies, vec![ws()]);
        assert_eq!(state[&list()].attributes["response_status"], AttrValue::Int(200));
        assert_eq!(state[&list()].attributes["response_body"], AttrValue::from("{}"));

        let again = plan(&provider, CHAIN, &state);
        assert!(again.plan.is_empty());
    }

    #[test]
    fn test_description_change_updates_in_place() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, CHAIN, &mut state);
        mock.clear_requests();

        let changed = CHAIN.replacen(r#"description = """#, r#"description = "Payments""#, 1);
        let report = apply(&provider, &client, &changed, &mut state);

        assert_eq!(report.summary.updated, 1);
        assert_eq!(report.summary.total_changes(), 1);
        assert_eq!(state[&ws()].id, "ws-1");
        assert_eq!(state[&ws()].attributes["description"], AttrValue::from("Payments"));
        assert_eq!(mock.requests_for(Method::Put).len(), 1);
        assert!(mock.requests_for(Method::Delete).is_empty());
    }

    #[test]
    fn test_slug_change_replaces_delete_then_create() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, CHAIN, &mut state);
        mock.clear_requests();

        let changed = CHAIN.replacen(r#"slug = "team-a""#, r#"slug = "team-b""#, 1);
        let planned = plan(&provider, &changed, &state);
        assert!(planned.plan.diffs().all(|d| d.action == Action::Replace));

        let report = apply(&provider, &client, &changed, &mut state);
        assert_eq!(report.summary.replaced, 3);
        assert_eq!(state[&ws()].id, "ws-2");
        assert_ne!(state[&orders()].id, "api-1");
        assert_eq!(
            state[&orders()].attributes["workspace_id"],
            AttrValue::from("ws-2")
        );
        assert_eq!(mock.counts(), (1, 1, 1));

        let methods: Vec<Method> = mock.requests().iter().map(|r| r.method).collect();
        let last_delete = methods.iter().rposition(|m| *m == Method::Delete).unwrap();
        let first_post = methods.iter().position(|m| *m == Method::Post).unwrap();
        assert!(last_delete < first_post);
    }

    #[test]
    fn test_targeted_replacement_recreates_dependents() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, CHAIN, &mut state);

        let changed = CHAIN.replacen(r#"slug = "orders""#, r#"slug = "orders-v2""#, 1);
        let target = Some("mock_api_studio_api.orders");
        let manifest = Manifest::parse(&changed).unwrap();
        let planned = build_plan(&provider, &Declared::new(manifest.resources()), &state)
            .unwrap()
            .targeted(target);
        assert_eq!(planned.plan.summary().replacements, 2);

        let report = apply_targeted(&provider, &client, &changed, target, &mut state);
        assert_eq!(report.summary.replaced, 2);
        assert_eq!(report.summary.removed, 0);
        assert_eq!(state.len(), 3);
        assert_eq!(state[&orders()].id, "api-2");
        assert_eq!(state[&list()].attributes["api_id"], AttrValue::from("api-2"));
        assert_eq!(mock.counts(), (1, 1, 1));
    }

    #[test]
    fn test_failed_create_tracks_nothing_and_skips_children() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.fail_next(Method::Post, "/admin/workspaces", 500);
        let mut state = StateMap::new();

        let report = apply(&provider, &client, CHAIN, &mut state);
        assert!(state.is_empty());
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.skipped, 2);
        assert!(matches!(
            report.results.iter().find(|(a, _)| *a == ws()).unwrap().1,
            ApplyResult::Failed { .. }
        ));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_failed_update_keeps_tracked_state() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, WORKSPACE, &mut state);
        let before = state.clone();

        mock.fail_next(Method::Put, "/admin/workspaces/", 500);
        let changed = WORKSPACE.replace(r#"name = "Team A""#, r#"name = "Team B""#);
        let report = apply(&provider, &client, &changed, &mut state);

        assert_eq!(report.summary.failed, 1);
        assert_eq!(state, before);
    }

    #[test]
    fn test_destroy_clears_state_and_never_reads_again() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, CHAIN, &mut state);
        mock.clear_requests();

        let report = apply(&provider, &client, "", &mut state);
        assert_eq!(report.summary.removed, 3);
        assert!(state.is_empty());
        assert_eq!(mock.counts(), (0, 0, 0));

        let paths: Vec<String> = mock
            .requests_for(Method::Delete)
            .iter()
            .map(|r| r.path.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/admin/api-definitions/api-1/endpoints/ep-1".to_string(),
                "/admin/api-definitions/api-1".to_string(),
                "/admin/workspaces/ws-1".to_string(),
            ]
        );

        mock.clear_requests();
        let driver = Driver::new(&provider, &client);
        assert!(refresh(&driver, &mut state).is_empty());
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_failed_delete_keeps_instance_and_parent() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, CHAIN, &mut state);

        mock.fail_next(Method::Delete, "/admin/api-definitions/api-1/endpoints/", 500);
        let report = apply(&provider, &client, "", &mut state);

        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(state.len(), 3);
        assert_eq!(mock.counts(), (1, 1, 1));
    }

    #[test]
    fn test_refresh_drops_instances_deleted_outside() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, WORKSPACE, &mut state);

        mock.remove_workspace("ws-1");
        let driver = Driver::new(&provider, &client);
        let diagnostics = refresh(&driver, &mut state);

        assert!(state.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);

        let again = plan(&provider, WORKSPACE, &state);
        assert_eq!(again.plan.apply[0].action, Action::Create);
    }

    #[test]
    fn test_refresh_failure_keeps_state() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, WORKSPACE, &mut state);
        let before = state.clone();

        mock.fail_next(Method::Get, "/admin/workspaces/", 503);
        let driver = Driver::new(&provider, &client);
        let diagnostics = refresh(&driver, &mut state);

        assert!(diagnostics[0].is_error());
        assert_eq!(state, before);
    }

    #[test]
    fn test_refresh_then_plan_detects_drift() {
        let provider = provider();
        let (client, mock) = testing::client();
        let mut state = StateMap::new();
        apply(&provider, &client, WORKSPACE, &mut state);

        mock.set_workspace_field("ws-1", "name", serde_json::json!("Renamed"));
        let driver = Driver::new(&provider, &client);
        refresh(&driver, &mut state);

        let planned = plan(&provider, WORKSPACE, &state);
        assert_eq!(planned.plan.apply[0].action, Action::Update);
    }

    #[test]
    fn test_read_failure_after_create_is_replaced_next_run() {
        let provider = provider();
        let (client, mock) = testing::client();
        mock.fail_next(Method::Get, "/admin/workspaces/", 500);
        let mut state = StateMap::new();

        let report = apply(&provider, &client, WORKSPACE, &mut state);
        assert_eq!(report.summary.failed, 1);
        assert!(state[&ws()].tainted);
        assert_eq!(state[&ws()].id, "ws-1");

        let planned = plan(&provider, WORKSPACE, &state);
        assert_eq!(planned.plan.apply[0].action, Action::Replace);

        let report = apply(&provider, &client, WORKSPACE, &mut state);
        assert_eq!(report.summary.replaced, 1);
        assert!(!state[&ws()].tainted);
        assert_eq!(state[&ws()].id, "ws-2");
        assert_eq!(mock.counts().0, 1);
    }

    #[test]
    fn test_webhook_is_never_tracked() {
        let provider = provider();
        let (client, mock) = testing::client();
        let manifest = format!(
            "{WORKSPACE}\n[resource.mock_api_studio_webhook.hook]\nworkspace_id = \"${{mock_api_studio_workspace.team_a.id}}\"\n"
        );
        let mut state = StateMap::new();

        let report = apply(&provider, &client, &manifest, &mut state);
        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.skipped, 1);
        assert!(!state.contains_key(&Address::new(webhook::KIND, "hook")));
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.summary == "Instance not tracked")
        );
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_data_sources() {
        let provider = provider();
        let (client, _mock) = testing::client();
        let driver = Driver::new(&provider, &client);

        let manifest = Manifest::parse(
            r#"
[data.mock_api_studio_workspace.lookup]
slug = "team-a"

[data.mock_api_studio_api.pending]
slug = "${mock_api_studio_workspace.team_a.slug}"
"#,
        )
        .unwrap();

        let outcomes = read_data_sources(&driver, &manifest.data_sources(), &StateMap::new());
        assert_eq!(outcomes.len(), 2);

        let (_, deferred) = &outcomes[0];
        assert_eq!(deferred.diagnostics[0].summary, "Data source read deferred");

        let (_, lookup) = &outcomes[1];
        assert!(lookup.diagnostics.is_empty());
        assert_eq!(lookup.attributes["slug"], AttrValue::from("team-a"));
    }
}
