//! Plan building - declared manifest vs tracked state

use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::{
    Action, Address, Attributes, DesiredState, ExecutionPlan, Provider, Resolution, ResourceDiff,
    StateMap, diff_instance,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::references::{self, dependencies_of};

/// Declared resources, as the executor sees them
#[derive(Debug, Clone, Default)]
pub struct Declared {
    resources: BTreeMap<Address, Attributes>,
}

impl Declared {
    pub fn new(resources: BTreeMap<Address, Attributes>) -> Self {
        Self { resources }
    }

    /// Nothing declared: every tracked instance is planned for deletion
    pub fn nothing() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&Attributes> {
        self.resources.get(address)
    }
}

impl DesiredState for Declared {
    fn dependencies(&self, address: &Address) -> Vec<Address> {
        self.resources
            .get(address)
            .map(dependencies_of)
            .unwrap_or_default()
    }

    fn resolve(&self, address: &Address, state: &StateMap) -> Resolution {
        let Some(attrs) = self.resources.get(address) else {
            return Resolution::Invalid(format!("{address} is not declared"));
        };
        match references::resolve(attrs, state) {
            Ok(resolved) if resolved.unknown.is_empty() => Resolution::Ready(resolved.attributes),
            Ok(resolved) => Resolution::Pending(format!(
                "{} not known yet",
                resolved.unknown.into_iter().collect::<Vec<_>>().join(", ")
            )),
            Err(e) => Resolution::Invalid(e.to_string()),
        }
    }
}

/// A plan with the order it was built in
#[derive(Debug, Clone, Default)]
pub struct Planned {
    pub plan: ExecutionPlan,
    /// Every declared or tracked address, dependencies first
    pub order: Vec<Address>,
    /// Dependency edges used for ordering and targeting
    pub graph: BTreeMap<Address, Vec<Address>>,
}

impl Planned {
    /// Narrow the plan to `target` ("kind" or "kind.name").
    ///
    /// Applying keeps what the target depends on; destroying keeps what
    /// depends on the target.
    pub fn targeted(self, target: Option<&str>) -> Self {
        let Some(target) = target else {
            return self;
        };
        let roots: BTreeSet<Address> = self
            .order
            .iter()
            .filter(|a| matches_target(a, target))
            .cloned()
            .collect();

        let downstream = closure(&roots, |a| {
            self.graph
                .iter()
                .filter(|(_, deps)| deps.contains(a))
                .map(|(dependent, _)| dependent.clone())
                .collect()
        });

        // A dependent replaced with the target is created again, with
        // whatever it needs
        let mut apply_roots = roots;
        apply_roots.extend(
            self.plan
                .destroy
                .iter()
                .filter(|d| d.action == Action::Replace && downstream.contains(&d.address))
                .map(|d| d.address.clone()),
        );
        let upstream = closure(&apply_roots, |a| {
            self.graph.get(a).cloned().unwrap_or_default()
        });

        let mut plan = self.plan;
        plan.apply.retain(|d| upstream.contains(&d.address));
        plan.destroy.retain(|d| downstream.contains(&d.address));
        log::debug!(
            "Target {target} keeps {} destroy and {} apply steps",
            plan.destroy.len(),
            plan.apply.len()
        );
        Self {
            plan,
            order: self.order,
            graph: self.graph,
        }
    }
}

fn matches_target(address: &Address, target: &str) -> bool {
    match Address::parse(target) {
        Some(t) => t == *address,
        None => address.kind == target,
    }
}

fn closure<F>(roots: &BTreeSet<Address>, next: F) -> BTreeSet<Address>
where
    F: Fn(&Address) -> Vec<Address>,
{
    let mut seen = roots.clone();
    let mut stack: Vec<Address> = roots.iter().cloned().collect();
    while let Some(address) = stack.pop() {
        for n in next(&address) {
            if seen.insert(n.clone()) {
                stack.push(n);
            }
        }
    }
    seen
}

/// Compare declarations with tracked state.
///
/// Instances are visited dependencies first. An instance that will be
/// destroyed is hidden from the instances visited after it, so a reference
/// to it becomes unknown; an immutable reference then forces the
/// dependent to be replaced as well.
pub fn build_plan<C>(
    provider: &Provider<C>,
    declared: &Declared,
    state: &StateMap,
) -> Result<Planned> {
    let misnamed: Vec<String> = declared
        .resources
        .keys()
        .filter(|a| !references::is_valid_name(&a.name))
        .map(|a| {
            format!(
                "{a}: invalid name `{}`; use letters, digits, `_` and `-`",
                a.name
            )
        })
        .collect();
    if !misnamed.is_empty() {
        bail!("Invalid configuration:\n  {}", misnamed.join("\n  "));
    }

    references::check_targets(&declared.resources)?;

    let mut graph: BTreeMap<Address, Vec<Address>> = BTreeMap::new();
    for (address, instance) in state {
        graph.insert(address.clone(), instance.dependencies.clone());
    }
    for address in declared.resources.keys() {
        graph.insert(address.clone(), declared.dependencies(address));
    }
    let order = references::dependency_order(&graph)?;

    let mut view = state.clone();
    let mut diffs: Vec<ResourceDiff> = Vec::with_capacity(order.len());
    let mut problems = Vec::new();

    for address in &order {
        let definition = provider
            .resource(&address.kind)
            .with_context(|| format!("Cannot plan {address}"))?;

        let resolved = match declared.get(address) {
            Some(attrs) => match references::resolve(attrs, &view) {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    problems.push(format!("{address}: {e}"));
                    continue;
                }
            },
            None => None,
        };

        if let Some(resolved) = &resolved
            && let Err(e) = definition
                .schema
                .validate_partial(&resolved.attributes, &resolved.unknown)
        {
            problems.push(format!("{address}: {}: {e}", e.summary()));
            continue;
        }

        let diff = diff_instance(
            address,
            definition,
            resolved.as_ref().map(|r| &r.attributes),
            &resolved.as_ref().map(|r| r.unknown.clone()).unwrap_or_default(),
            state.get(address),
        );
        log::debug!("Planned {} for {address}", diff.action);
        if diff.action.destroys() {
            view.remove(address);
        }
        diffs.push(diff);
    }

    if !problems.is_empty() {
        bail!("Invalid configuration:\n  {}", problems.join("\n  "));
    }

    Ok(Planned {
        plan: ExecutionPlan::from_diffs(diffs, &order),
        order,
        graph,
    })
}
