//! Cross-resource references
//!
//! A declared value may embed `${kind.name.attr}`; the reference is replaced
//! with the attribute of the tracked instance at `kind.name` (`id` is the
//! remote identifier). A value whose target is not tracked yet is unknown
//! until that target has been applied. References also define the order in
//! which instances are created and destroyed.

use declarative::{Address, AttrValue, Attributes, ResourceData, StateMap};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use thiserror::Error;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)\.([A-Za-z0-9_-]+)\.([A-Za-z0-9_]+)\}")
        .expect("Invalid reference regex")
});

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid name regex"));

/// Whether `name` can be used as an instance name and referenced
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// One `${kind.name.attr}` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: Address,
    pub attribute: String,
}

impl Reference {
    fn from_captures(caps: &Captures<'_>) -> Self {
        Self {
            target: Address::new(&caps[1], &caps[2]),
            attribute: caps[3].to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("{from} references {target}, which is not declared")]
    Undeclared { from: Address, target: Address },

    #[error("{target} has no attribute `{attribute}`")]
    UnknownAttribute { target: Address, attribute: String },

    #[error("dependency cycle between {}", join(.0))]
    Cycle(Vec<Address>),
}

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// References embedded in a value
pub fn references_in(value: &AttrValue) -> Vec<Reference> {
    match value {
        AttrValue::String(s) => REFERENCE
            .captures_iter(s)
            .map(|caps| Reference::from_captures(&caps))
            .collect(),
        _ => Vec::new(),
    }
}

/// Distinct addresses referenced by a set of attributes
pub fn dependencies_of(attrs: &Attributes) -> Vec<Address> {
    attrs
        .values()
        .flat_map(references_in)
        .map(|r| r.target)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Check that every reference points at a declared instance
pub fn check_targets(declared: &BTreeMap<Address, Attributes>) -> Result<(), ReferenceError> {
    for (address, attrs) in declared {
        for target in dependencies_of(attrs) {
            if !declared.contains_key(&target) {
                return Err(ReferenceError::Undeclared {
                    from: address.clone(),
                    target,
                });
            }
        }
    }
    Ok(())
}

/// Declared attributes after substitution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Attributes whose references could all be substituted
    pub attributes: Attributes,
    /// Attributes waiting on an instance that is not tracked yet
    pub unknown: BTreeSet<String>,
}

/// Substitute references using tracked state.
///
/// A value that is exactly one reference takes the referenced value with
/// its type; otherwise references are spliced into the string.
pub fn resolve(attrs: &Attributes, state: &StateMap) -> Result<Resolved, ReferenceError> {
    let mut resolved = Resolved::default();

    for (name, value) in attrs {
        let refs = references_in(value);
        if refs.is_empty() {
            resolved.attributes.insert(name.clone(), value.clone());
            continue;
        }
        if refs.iter().any(|r| !state.contains_key(&r.target)) {
            resolved.unknown.insert(name.clone());
            continue;
        }

        let text = value.as_str().unwrap_or_default();
        let whole = REFERENCE
            .find(text)
            .is_some_and(|m| m.start() == 0 && m.end() == text.len());

        let value = if whole {
            lookup(&refs[0], state)?
        } else {
            AttrValue::String(splice(text, state)?)
        };
        resolved.attributes.insert(name.clone(), value);
    }

    Ok(resolved)
}

fn lookup(reference: &Reference, state: &StateMap) -> Result<AttrValue, ReferenceError> {
    let unknown = || ReferenceError::UnknownAttribute {
        target: reference.target.clone(),
        attribute: reference.attribute.clone(),
    };
    let instance = state.get(&reference.target).ok_or_else(unknown)?;
    if reference.attribute == "id" {
        return Ok(AttrValue::String(instance.id.clone()));
    }
    instance
        .attributes
        .get(&reference.attribute)
        .cloned()
        .ok_or_else(unknown)
}

fn splice(text: &str, state: &StateMap) -> Result<String, ReferenceError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in REFERENCE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        match lookup(&Reference::from_captures(&caps), state)? {
            AttrValue::String(s) => out.push_str(&s),
            other => out.push_str(&other.to_string()),
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Order addresses so every dependency precedes its dependents.
///
/// Dependencies outside the graph are ignored. Ties are broken by address
/// so the order is stable between runs.
pub fn dependency_order(
    graph: &BTreeMap<Address, Vec<Address>>,
) -> Result<Vec<Address>, ReferenceError> {
    let mut pending: BTreeMap<&Address, usize> = graph
        .iter()
        .map(|(address, deps)| {
            let count = deps
                .iter()
                .filter(|d| graph.contains_key(*d))
                .collect::<BTreeSet<_>>()
                .len();
            (address, count)
        })
        .collect();

    let mut dependents: BTreeMap<&Address, Vec<&Address>> = BTreeMap::new();
    for (address, deps) in graph {
        for dep in deps.iter().collect::<BTreeSet<_>>() {
            if graph.contains_key(dep) {
                dependents.entry(dep).or_default().push(address);
            }
        }
    }

    let mut ready: BTreeSet<&Address> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(address, _)| *address)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(address) = ready.pop_first() {
        pending.remove(address);
        order.push(address.clone());
        for dependent in dependents.get(address).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if !pending.is_empty() {
        return Err(ReferenceError::Cycle(
            pending.keys().map(|a| (*a).clone()).collect(),
        ));
    }
    Ok(order)
}

/// The parent identifier a child needs before any remote call.
///
/// Only presence is checked; whether the parent exists is for the service
/// to decide.
pub fn require_parent<'a>(data: &'a ResourceData, attribute: &str) -> declarative::Result<&'a str> {
    let id = data.require_str(attribute)?;
    if REFERENCE.is_match(id) {
        return Err(declarative::Error::Invalid(format!(
            "`{attribute}` still holds an unresolved reference: {id}"
        )));
    }
    log::trace!("Parent {attribute} = {id}");
    Ok(id)
}
