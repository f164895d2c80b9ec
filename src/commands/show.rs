//! `show` - print tracked state

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{Address, Provider, TrackedInstance};

use crate::Context;
use crate::provider;
use crate::state::ProviderState;
use crate::ui;

pub fn run(ctx: &Context, address: Option<&str>) -> Result<()> {
    let stored = ProviderState::load(&ctx.state)?;
    let state = stored.to_map()?;
    let provider = provider::provider();

    let selected: Vec<(&Address, &TrackedInstance)> = match address {
        Some(wanted) => {
            let Some(entry) = state.iter().find(|(a, _)| a.to_string() == wanted) else {
                bail!("{wanted} is not tracked in {}", ctx.state.display());
            };
            vec![entry]
        }
        None => state.iter().collect(),
    };

    if selected.is_empty() {
        ui::info("No instances are tracked");
        return Ok(());
    }

    ui::header(&format!("Tracked state ({})", ctx.state.display()));
    ui::dim(&format!(
        "Last updated {}",
        stored.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for (address, instance) in selected {
        let title = if instance.tainted {
            format!("{address} {}", "(tainted)".red())
        } else {
            address.to_string()
        };
        ui::section(&title);
        for (key, value) in rows(&provider, instance) {
            ui::kv(&key, &value);
        }
    }
    Ok(())
}

/// Display rows for one instance, sensitive values masked
fn rows<C>(provider: &Provider<C>, instance: &TrackedInstance) -> Vec<(String, String)> {
    let sensitive: Vec<&str> = provider
        .resource(&instance.kind)
        .map(|d| d.schema.sensitive_names().collect())
        .unwrap_or_default();

    let mut rows = vec![("id".to_string(), instance.id.clone())];
    for (name, value) in &instance.attributes {
        let shown = if sensitive.contains(&name.as_str()) {
            ui::redact(&value.to_string())
        } else {
            value.to_string()
        };
        rows.push((name.clone(), shown));
    }
    if !instance.dependencies.is_empty() {
        let deps: Vec<String> = instance.dependencies.iter().map(ToString::to_string).collect();
        rows.push(("depends on".to_string(), deps.join(", ")));
    }
    rows
}
