//! Execution planner - orders diffs into destroy and apply phases

use crate::diff::{Action, DiffSummary, ResourceDiff};
use crate::types::Address;
use std::collections::HashMap;

/// Diffs split into the two phases the executor runs
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Deletes and the destroy half of replacements, dependents first
    pub destroy: Vec<ResourceDiff>,
    /// Creates, updates and the create half of replacements, dependencies
    /// first
    pub apply: Vec<ResourceDiff>,
    /// Instances with nothing to do
    pub unchanged: Vec<Address>,
}

impl ExecutionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from diffs.
    ///
    /// `order` lists addresses with every dependency before its dependents;
    /// addresses missing from it sort last, by address.
    pub fn from_diffs(diffs: Vec<ResourceDiff>, order: &[Address]) -> Self {
        let rank: HashMap<&Address, usize> =
            order.iter().enumerate().map(|(i, a)| (a, i)).collect();
        let position = |address: &Address| rank.get(address).copied().unwrap_or(usize::MAX);

        let mut plan = Self::new();
        for diff in diffs {
            match diff.action {
                Action::NoOp => plan.unchanged.push(diff.address),
                Action::Delete => plan.destroy.push(diff),
                Action::Create | Action::Update => plan.apply.push(diff),
                Action::Replace => {
                    plan.destroy.push(diff.clone());
                    plan.apply.push(diff);
                }
            }
        }

        plan.apply.sort_by(|a, b| {
            position(&a.address)
                .cmp(&position(&b.address))
                .then_with(|| a.address.cmp(&b.address))
        });
        plan.destroy.sort_by(|a, b| {
            position(&b.address)
                .cmp(&position(&a.address))
                .then_with(|| a.address.cmp(&b.address))
        });
        plan
    }

    /// Every planned change, each instance once.
    ///
    /// A replacement whose create half was left out is listed from the
    /// destroy phase.
    pub fn diffs(&self) -> impl Iterator<Item = &ResourceDiff> {
        self.destroy
            .iter()
            .filter(|d| d.action == Action::Delete || !self.applies(&d.address))
            .chain(self.apply.iter())
    }

    /// Whether the apply phase has a step for `address`
    pub fn applies(&self, address: &Address) -> bool {
        self.apply.iter().any(|d| &d.address == address)
    }

    pub fn summary(&self) -> DiffSummary {
        let diffs: Vec<ResourceDiff> = self.diffs().cloned().collect();
        DiffSummary::from_diffs(&diffs)
    }

    /// Number of instances with a change
    pub fn total_changes(&self) -> usize {
        self.diffs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.destroy.is_empty() && self.apply.is_empty()
    }
}
