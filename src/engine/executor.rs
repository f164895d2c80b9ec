//! Execution engine - runs a plan with terminal progress and confirmation

use anyhow::Result;
use colored::Colorize;
use declarative::{
    Action, Address, ApplyResult, ConfirmCallback, DesiredState, Driver, ExecuteOptions,
    ExecuteReport, ExecuteSummary, ProgressCallback, StateMap, execute,
};

use super::differ::display_plan;
use super::planner::Planned;
use crate::ui;

/// Options for a host run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Skip the confirmation prompt
    pub auto_approve: bool,
    /// Show the plan but change nothing
    pub dry_run: bool,
    pub prompt: String,
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            auto_approve: false,
            dry_run: false,
            prompt: "Apply these changes?".to_string(),
            quiet: false,
        }
    }
}

/// Prints one line per instance as the executor works
pub struct TerminalProgress {
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_phase_start(&mut self, phase: &str, count: usize) {
        if self.quiet {
            return;
        }
        let verb = if phase == "destroy" {
            "Destroying"
        } else {
            "Applying"
        };
        println!();
        println!("  {} {} {} instances...", "→".cyan(), verb, count);
    }

    fn on_instance_start(&mut self, address: &Address, action: Action) {
        log::debug!("{action} {address}");
    }

    fn on_instance_complete(&mut self, address: &Address, result: &ApplyResult) {
        if self.quiet && result.is_success() {
            return;
        }
        let (symbol, detail) = match result {
            ApplyResult::NoChange => ("○".dimmed(), "unchanged".to_string()),
            ApplyResult::Created => ("✓".green(), "created".to_string()),
            ApplyResult::Updated => ("✓".green(), "updated".to_string()),
            ApplyResult::Replaced => ("✓".green(), "replaced".to_string()),
            ApplyResult::Removed => ("✓".green(), "destroyed".to_string()),
            ApplyResult::Failed { error } => ("✗".red(), error.clone()),
            ApplyResult::Skipped { reason } => ("⊘".yellow(), format!("skipped: {reason}")),
        };
        println!("    {} {} {}", symbol, address, detail.dimmed());
    }

    fn on_phase_complete(&mut self) {}
}

/// Asks on the terminal
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}

/// Display the plan, confirm, execute it and print the outcome.
///
/// `state` is updated in place; the caller persists it.
pub fn run<C, D>(
    driver: &Driver<'_, C>,
    planned: &Planned,
    desired: &D,
    state: &mut StateMap,
    opts: &RunOptions,
    confirm: &mut dyn ConfirmCallback,
) -> Result<ExecuteReport>
where
    D: DesiredState,
{
    display_plan(&planned.plan);

    if opts.dry_run && !planned.plan.is_empty() {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
    }

    let exec_opts = ExecuteOptions {
        dry_run: opts.dry_run,
        prompt: opts.prompt.clone(),
    };
    let mut progress = TerminalProgress::new(opts.quiet);
    let mut approve = Approval {
        auto: opts.auto_approve,
        inner: confirm,
    };

    let report = execute(
        driver,
        &planned.plan,
        &exec_opts,
        desired,
        state,
        &mut progress,
        &mut approve,
    )?;

    if report.declined {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(report);
    }

    if !report.diagnostics.is_empty() {
        println!();
        ui::diagnostics(&report.diagnostics);
    }
    if !opts.dry_run && !planned.plan.is_empty() {
        print_summary(&report.summary);
    }
    Ok(report)
}

/// Skips the prompt when approval was given up front
struct Approval<'c> {
    auto: bool,
    inner: &'c mut dyn ConfirmCallback,
}

impl ConfirmCallback for Approval<'_> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.auto {
            return Ok(true);
        }
        self.inner.confirm(prompt)
    }
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Apply complete!", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} instances created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} instances updated", summary.updated);
    }
    if summary.replaced > 0 {
        println!("    • {} instances replaced", summary.replaced);
    }
    if summary.removed > 0 {
        println!("    • {} instances destroyed", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} instances skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "instances".red());
    }
}
