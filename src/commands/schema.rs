//! `schema` - print the provider's schemas as JSON

use anyhow::{Context as _, Result};
use declarative::{Provider, Schema};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::provider;

#[derive(Serialize)]
struct KindSchema<'a> {
    description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    updatable: bool,
    attributes: &'a Schema,
}

#[derive(Serialize)]
struct ProviderSchema<'a> {
    provider: &'static str,
    config: &'a Schema,
    resources: BTreeMap<&'static str, KindSchema<'a>>,
    data_sources: BTreeMap<&'static str, KindSchema<'a>>,
}

fn describe<C>(provider: &Provider<C>) -> ProviderSchema<'_> {
    ProviderSchema {
        provider: provider.name,
        config: &provider.config_schema,
        resources: provider
            .resources()
            .map(|d| {
                let schema = KindSchema {
                    description: d.description,
                    updatable: d.update.is_some(),
                    attributes: &d.schema,
                };
                (d.kind, schema)
            })
            .collect(),
        data_sources: provider
            .data_sources()
            .map(|d| {
                let schema = KindSchema {
                    description: d.description,
                    updatable: false,
                    attributes: &d.schema,
                };
                (d.kind, schema)
            })
            .collect(),
    }
}

pub fn run() -> Result<()> {
    let provider = provider::provider();
    let json = serde_json::to_string_pretty(&describe(&provider))
        .context("Failed to serialize provider schema")?;
    println!("{json}");
    Ok(())
}
