//! Diff computation between declared and tracked instances

use crate::resource::ResourceDefinition;
use crate::types::{Address, AttrValue, Attributes, TrackedInstance};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What has to happen to one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    NoOp,
    Create,
    Update,
    /// Destroy, then create with a new identifier
    Replace,
    Delete,
}

impl Action {
    /// Plan symbol, as printed next to each address
    pub fn symbol(self) -> &'static str {
        match self {
            Self::NoOp => " ",
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Delete => "-",
        }
    }

    /// Whether the old instance is destroyed
    pub fn destroys(self) -> bool {
        matches!(self, Self::Replace | Self::Delete)
    }

    /// Whether a create or update call is made
    pub fn applies(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Replace)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        })
    }
}

/// One attribute that differs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Option<AttrValue>,
    /// `None` means known after apply
    pub after: Option<AttrValue>,
    pub requires_replacement: bool,
}

/// A diff between tracked and declared state of one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDiff {
    pub address: Address,
    pub action: Action,
    pub changes: Vec<AttributeChange>,
    /// Why the action was chosen, when it isn't obvious from the changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ResourceDiff {
    pub fn kind(&self) -> &str {
        &self.address.kind
    }
}

/// Compare one instance.
///
/// `desired` is `None` when the declaration was removed; `unknown` names
/// attributes whose value is not known until earlier instances are applied.
/// A tainted instance is always replaced. A definition without an update
/// function replaces on any change.
pub fn diff_instance<C>(
    address: &Address,
    definition: &ResourceDefinition<C>,
    desired: Option<&Attributes>,
    unknown: &BTreeSet<String>,
    tracked: Option<&TrackedInstance>,
) -> ResourceDiff {
    let mut diff = ResourceDiff {
        address: address.clone(),
        action: Action::NoOp,
        changes: Vec::new(),
        reason: None,
    };

    let Some(desired) = desired else {
        if tracked.is_some() {
            diff.action = Action::Delete;
        }
        return diff;
    };
    let desired = definition.schema.normalize(desired);

    let Some(tracked) = tracked else {
        diff.action = Action::Create;
        diff.changes = definition
            .schema
            .iter()
            .filter_map(|attribute| {
                let after = if unknown.contains(attribute.name) {
                    None
                } else {
                    Some(desired.get(attribute.name)?.clone())
                };
                Some(AttributeChange {
                    name: attribute.name.to_string(),
                    before: None,
                    after,
                    requires_replacement: false,
                })
            })
            .collect();
        return diff;
    };

    let can_update = definition.update.is_some();
    for attribute in definition.schema.iter() {
        let before = tracked.attributes.get(attribute.name);
        let after = if unknown.contains(attribute.name) {
            None
        } else {
            match desired.get(attribute.name) {
                Some(value) => Some(value),
                // Left undeclared with no default: whatever the remote has
                None => continue,
            }
        };
        if after.is_some() && after == before {
            continue;
        }
        diff.changes.push(AttributeChange {
            name: attribute.name.to_string(),
            before: before.cloned(),
            after: after.cloned(),
            requires_replacement: attribute.is_immutable() || !can_update,
        });
    }

    if tracked.tainted {
        diff.action = Action::Replace;
        diff.reason = Some("instance is tainted".to_string());
    } else if diff.changes.iter().any(|c| c.requires_replacement) {
        diff.action = Action::Replace;
    } else if !diff.changes.is_empty() {
        diff.action = Action::Update;
    }

    diff
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub additions: usize,
    pub updates: usize,
    pub replacements: usize,
    pub removals: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::NoOp => {}
                Action::Create => summary.additions += 1,
                Action::Update => summary.updates += 1,
                Action::Replace => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
            }
        }
        summary
    }
}

/// Group diffs by resource kind
pub fn group_by_kind(diffs: &[ResourceDiff]) -> BTreeMap<&str, Vec<&ResourceDiff>> {
    let mut groups: BTreeMap<&str, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        groups.entry(diff.kind()).or_default().push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::resource::ResourceData;
    use crate::schema::{Attribute, Schema};
    use crate::types::attributes;

    fn noop(_: &(), _: &mut ResourceData) -> Result<()> {
        Ok(())
    }

    fn noop_delete(_: &(), _: &ResourceData) -> Result<()> {
        Ok(())
    }

    fn workspace() -> ResourceDefinition<()> {
        ResourceDefinition {
            kind: "workspace",
            description: "",
            schema: Schema::new(vec![
                Attribute::string("name").required(),
                Attribute::string("slug").required().immutable(),
                Attribute::string("description").default_value(""),
            ]),
            create: noop,
            read: noop,
            update: Some(noop),
            delete: noop_delete,
        }
    }

    fn tracked(name: &str, slug: &str, description: &str) -> TrackedInstance {
        TrackedInstance {
            kind: "workspace".into(),
            id: "ws-1".into(),
            attributes: attributes([
                ("name", AttrValue::from(name)),
                ("slug", slug.into()),
                ("description", description.into()),
            ]),
            tainted: false,
            dependencies: vec![],
        }
    }

    fn address() -> Address {
        Address::new("workspace", "team_a")
    }

    fn declared(name: &str, slug: &str) -> Attributes {
        attributes([("name", AttrValue::from(name)), ("slug", slug.into())])
    }

    #[test]
    fn test_new_instance_is_create_with_defaults() {
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&declared("Team A", "team-a")),
            &BTreeSet::new(),
            None,
        );
        assert_eq!(diff.action, Action::Create);
        let description = diff
            .changes
            .iter()
            .find(|c| c.name == "description")
            .unwrap();
        assert_eq!(description.after, Some(AttrValue::from("")));
    }

    #[test]
    fn test_unchanged_is_noop() {
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&declared("Team A", "team-a")),
            &BTreeSet::new(),
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::NoOp);
        assert!(diff.changes.is_empty());
    }

    #[test]
    fn test_mutable_change_is_update() {
        let mut desired = declared("Team A", "team-a");
        desired.insert("description".into(), "payments".into());
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&desired),
            &BTreeSet::new(),
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::Update);
        assert_eq!(diff.changes.len(), 1);
        assert!(!diff.changes[0].requires_replacement);
    }

    #[test]
    fn test_immutable_change_is_replace() {
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&declared("Team A", "team-b")),
            &BTreeSet::new(),
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::Replace);
        assert_eq!(diff.changes[0].name, "slug");
        assert!(diff.changes[0].requires_replacement);
    }

    #[test]
    fn test_without_update_any_change_replaces() {
        let mut definition = workspace();
        definition.update = None;
        let diff = diff_instance(
            &address(),
            &definition,
            Some(&declared("Team B", "team-a")),
            &BTreeSet::new(),
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::Replace);
    }

    #[test]
    fn test_unknown_immutable_value_replaces() {
        let mut desired = declared("Team A", "team-a");
        desired.remove("slug");
        let unknown = BTreeSet::from(["slug".to_string()]);
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&desired),
            &unknown,
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::Replace);
        assert_eq!(diff.changes[0].after, None);
    }

    #[test]
    fn test_tainted_is_replaced() {
        let mut instance = tracked("Team A", "team-a", "");
        instance.tainted = true;
        let diff = diff_instance(
            &address(),
            &workspace(),
            Some(&declared("Team A", "team-a")),
            &BTreeSet::new(),
            Some(&instance),
        );
        assert_eq!(diff.action, Action::Replace);
        assert_eq!(diff.reason.as_deref(), Some("instance is tainted"));
    }

    #[test]
    fn test_removed_declaration_is_delete() {
        let diff = diff_instance(
            &address(),
            &workspace(),
            None,
            &BTreeSet::new(),
            Some(&tracked("Team A", "team-a", "")),
        );
        assert_eq!(diff.action, Action::Delete);
    }

    #[test]
    fn test_summary_and_grouping() {
        let diffs = vec![
            ResourceDiff {
                address: Address::new("workspace", "a"),
                action: Action::Create,
                changes: vec![],
                reason: None,
            },
            ResourceDiff {
                address: Address::new("workspace", "b"),
                action: Action::Replace,
                changes: vec![],
                reason: None,
            },
            ResourceDiff {
                address: Address::new("api", "c"),
                action: Action::NoOp,
                changes: vec![],
                reason: None,
            },
        ];
        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.replacements, 1);

        let groups = group_by_kind(&diffs);
        assert_eq!(groups["workspace"].len(), 2);
        assert_eq!(groups["api"].len(), 1);
    }
}
