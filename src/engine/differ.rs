//! Plan display

use colored::{ColoredString, Colorize};
use declarative::{
    Action, AttrValue, AttributeChange, ExecutionPlan, ResourceDiff, group_by_kind,
};

/// Kind name without the provider prefix, for group headings
fn kind_label(kind: &str) -> &str {
    match kind {
        "mock_api_studio_workspace" => "Workspaces",
        "mock_api_studio_api" => "API definitions",
        "mock_api_studio_endpoint" => "Endpoints",
        "mock_api_studio_webhook" => "Webhooks",
        other => other,
    }
}

fn symbol(action: Action) -> ColoredString {
    match action {
        Action::Create => action.symbol().green(),
        Action::Update => action.symbol().yellow(),
        Action::Replace => action.symbol().magenta(),
        Action::Delete => action.symbol().red(),
        Action::NoOp => action.symbol().dimmed(),
    }
}

fn value(value: Option<&AttrValue>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(known after apply)".to_string(),
    }
}

/// One attribute line of a diff, without colour
pub fn format_change(action: Action, change: &AttributeChange) -> String {
    let mut line = match action {
        Action::Create => format!("{} = {}", change.name, value(change.after.as_ref())),
        _ => format!(
            "{}: {} → {}",
            change.name,
            change
                .before
                .as_ref()
                .map_or_else(|| "(unset)".to_string(), ToString::to_string),
            value(change.after.as_ref())
        ),
    };
    if change.requires_replacement && action == Action::Replace {
        line.push_str(" (forces replacement)");
    }
    line
}

fn display_one(diff: &ResourceDiff) {
    let note = match diff.action {
        Action::Create => "will be created",
        Action::Update => "will be updated in place",
        Action::Replace => "must be replaced",
        Action::Delete => "will be destroyed",
        Action::NoOp => "",
    };
    println!(
        "│   {} {:<40} {}",
        symbol(diff.action),
        diff.address.to_string(),
        note.dimmed()
    );
    if let Some(reason) = &diff.reason {
        println!("│       {}", format!("({reason})").dimmed());
    }
    if diff.action != Action::Delete {
        for change in &diff.changes {
            println!("│       {}", format_change(diff.action, change));
        }
    }
}

/// Display a plan in a user-friendly format
pub fn display_plan(plan: &ExecutionPlan) {
    let diffs: Vec<ResourceDiff> = plan.diffs().cloned().collect();
    if diffs.is_empty() {
        println!();
        println!("  {} No changes. Remote state matches the manifest.", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    for (kind, kind_diffs) in group_by_kind(&diffs) {
        println!("│ {}", kind_label(kind).bold());
        for diff in kind_diffs {
            display_one(diff);
        }
        println!("│");
    }

    let summary = plan.summary();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to add, {} to change, {} to replace, {} to destroy",
        summary.additions.to_string().green(),
        summary.updates.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}
