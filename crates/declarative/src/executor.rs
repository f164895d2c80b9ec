//! Execution engine - applies a plan instance by instance
//!
//! The destroy phase runs first, dependents before their dependencies; the
//! apply phase follows, dependencies first. Declared attributes are
//! resolved again right before each create or update so values produced
//! earlier in the same run (new identifiers) flow into dependents. An
//! instance whose dependency failed or was skipped is skipped too.

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diagnostic::Diagnostic;
use crate::diff::{Action, ResourceDiff};
use crate::driver::{Driver, Outcome};
use crate::planner::ExecutionPlan;
use crate::types::{Address, ApplyResult, Attributes, ExecuteSummary, TrackedInstance};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Tracked instances by address
pub type StateMap = BTreeMap<Address, TrackedInstance>;

/// Declared attributes, resolved against current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ready(Attributes),
    /// Depends on a value that does not exist yet
    Pending(String),
    Invalid(String),
}

/// Source of declared state for the executor
pub trait DesiredState {
    /// Addresses `address` depends on
    fn dependencies(&self, address: &Address) -> Vec<Address>;

    /// Declared attributes of `address` with references substituted
    fn resolve(&self, address: &Address, state: &StateMap) -> Resolution;
}

/// Options for [`execute`]
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Plan only; make no remote calls
    pub dry_run: bool,
    /// Confirmation prompt shown before any change
    pub prompt: String,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            prompt: "Apply changes?".to_string(),
        }
    }
}

/// What happened during execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub summary: ExecuteSummary,
    /// One entry per planned instance, in execution order
    pub results: Vec<(Address, ApplyResult)>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the confirmation was declined
    pub declined: bool,
}

impl ExecuteReport {
    fn record(&mut self, address: &Address, result: ApplyResult) {
        self.summary.add_result(&result);
        self.results.push((address.clone(), result));
    }
}

/// Execute a plan, updating `state` as each instance completes
///
/// # Arguments
/// * `driver` - Runs lifecycle operations for each instance
/// * `plan` - The execution plan to run
/// * `desired` - Declared state, resolved per instance at execution time
/// * `state` - Tracked state; updated in place
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
///
/// # Errors
/// Only confirmation failures are returned; instance failures are
/// recorded in the report.
pub fn execute<C, D, P, F>(
    driver: &Driver<'_, C>,
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    desired: &D,
    state: &mut StateMap,
    progress: &mut P,
    confirm: &mut F,
) -> Result<ExecuteReport>
where
    D: DesiredState,
    P: ProgressCallback,
    F: ConfirmCallback,
{
    let mut report = ExecuteReport::default();
    if plan.is_empty() || opts.dry_run {
        return Ok(report);
    }

    if !confirm.confirm(&opts.prompt)? {
        report.declined = true;
        report.summary.skipped = plan.total_changes();
        return Ok(report);
    }

    let mut run = Run {
        driver,
        desired,
        state,
        blocked: BTreeSet::new(),
        reported: BTreeSet::new(),
        report,
    };

    if !plan.destroy.is_empty() {
        progress.on_phase_start("destroy", plan.destroy.len());
        for diff in &plan.destroy {
            progress.on_instance_start(&diff.address, diff.action);
            let result = run.destroy(diff);
            progress.on_instance_complete(&diff.address, &result);
            // The create half of a replacement reports the final result
            if diff.action == Action::Delete
                || !result.is_converged()
                || !plan.applies(&diff.address)
            {
                run.finish(&diff.address, result);
            }
        }
        progress.on_phase_complete();
    }

    if !plan.apply.is_empty() {
        progress.on_phase_start("apply", plan.apply.len());
        for diff in &plan.apply {
            if run.reported.contains(&diff.address) {
                continue;
            }
            progress.on_instance_start(&diff.address, diff.action);
            let result = run.apply(diff);
            progress.on_instance_complete(&diff.address, &result);
            run.finish(&diff.address, result);
        }
        progress.on_phase_complete();
    }

    Ok(run.report)
}

struct Run<'r, 'a, C, D> {
    driver: &'r Driver<'a, C>,
    desired: &'r D,
    state: &'r mut StateMap,
    /// Instances that did not converge; their dependents are skipped
    blocked: BTreeSet<Address>,
    reported: BTreeSet<Address>,
    report: ExecuteReport,
}

impl<C, D: DesiredState> Run<'_, '_, C, D> {
    fn finish(&mut self, address: &Address, result: ApplyResult) {
        if !result.is_converged() {
            self.blocked.insert(address.clone());
        }
        self.reported.insert(address.clone());
        self.report.record(address, result);
    }

    /// Keep the outcome's state and diagnostics; report failure if any
    fn absorb(&mut self, address: &Address, outcome: Outcome) -> Option<String> {
        match outcome.state {
            Some(instance) => {
                self.state.insert(address.clone(), instance);
            }
            None => {
                self.state.remove(address);
            }
        }
        let errors: Vec<String> = outcome
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| format!("{}: {}", d.summary, d.detail))
            .collect();
        self.report.diagnostics.extend(outcome.diagnostics);
        if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        }
    }

    fn destroy(&mut self, diff: &ResourceDiff) -> ApplyResult {
        let Some(prior) = self.state.get(&diff.address).cloned() else {
            return ApplyResult::NoChange;
        };

        // A dependent that failed to go away still needs this instance
        let holder = self.blocked.iter().find(|blocked| {
            self.state
                .get(*blocked)
                .is_some_and(|i| i.dependencies.contains(&diff.address))
        });
        if let Some(holder) = holder {
            return ApplyResult::Skipped {
                reason: format!("dependent {holder} was not destroyed"),
            };
        }

        let outcome = self.driver.delete(&diff.address, &prior);
        match self.absorb(&diff.address, outcome) {
            Some(error) => ApplyResult::Failed { error },
            None => ApplyResult::Removed,
        }
    }

    fn apply(&mut self, diff: &ResourceDiff) -> ApplyResult {
        let dependencies = self.desired.dependencies(&diff.address);
        if let Some(dep) = dependencies.iter().find(|d| self.blocked.contains(*d)) {
            return ApplyResult::Skipped {
                reason: format!("dependency {dep} was not applied"),
            };
        }

        let attributes = match self.desired.resolve(&diff.address, self.state) {
            Resolution::Ready(attributes) => attributes,
            Resolution::Pending(reason) => return ApplyResult::Skipped { reason },
            Resolution::Invalid(error) => {
                self.report.diagnostics.push(
                    Diagnostic::error("Invalid reference", error.clone())
                        .with_address(&diff.address),
                );
                return ApplyResult::Failed { error };
            }
        };

        let prior = self.state.get(&diff.address).cloned();
        let outcome = match (diff.action, prior) {
            (Action::Update, Some(prior)) => {
                self.driver
                    .update(&diff.address, &prior, &attributes, dependencies)
            }
            (Action::Update, None) => {
                return ApplyResult::Failed {
                    error: format!("{} is not tracked", diff.address),
                };
            }
            (_, Some(_)) => {
                return ApplyResult::Failed {
                    error: format!("{} still exists and cannot be created again", diff.address),
                };
            }
            (_, None) => self.driver.create(&diff.address, &attributes, dependencies),
        };

        let tracked = outcome.state.is_some();
        if let Some(error) = self.absorb(&diff.address, outcome) {
            return ApplyResult::Failed { error };
        }
        match diff.action {
            Action::Update => ApplyResult::Updated,
            _ if !tracked => ApplyResult::Skipped {
                reason: "no identifier was assigned".to_string(),
            },
            Action::Replace => ApplyResult::Replaced,
            _ => ApplyResult::Created,
        }
    }
}
