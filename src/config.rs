//! Manifest loading and provider configuration
//!
//! The manifest is a TOML file with three top-level tables:
//!
//! ```toml
//! [provider]
//! api_url = "http://localhost:3000"
//!
//! [resource.mock_api_studio_workspace.team_a]
//! name = "Team A"
//! slug = "team-a"
//!
//! [data.mock_api_studio_workspace.lookup]
//! slug = "team-a"
//! ```

use anyhow::{Context, Result};
use declarative::{Address, AttrValue, Attributes, Schema};
use mockapi_client::{ClientConfig, DEFAULT_API_URL};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Environment variable consulted when `api_url` is not set
pub const ENV_API_URL: &str = "MOCK_API_STUDIO_URL";

/// Environment variable consulted when `api_token` is not set
pub const ENV_API_TOKEN: &str = "MOCK_API_STUDIO_TOKEN";

/// Declarations grouped by kind, then by name
pub type Declarations = BTreeMap<String, BTreeMap<String, Attributes>>;

/// Desired state as written by the operator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Provider configuration block
    #[serde(default)]
    pub provider: Attributes,

    /// Managed resources: `[resource.<kind>.<name>]`
    #[serde(default)]
    pub resource: Declarations,

    /// Data sources: `[data.<kind>.<name>]`
    #[serde(default)]
    pub data: Declarations,
}

impl Manifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let manifest = Self::parse(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        log::debug!(
            "Loaded manifest {} ({} resources, {} data sources)",
            path.display(),
            manifest.resources().len(),
            manifest.data_sources().len()
        );
        Ok(manifest)
    }

    /// Parse manifest text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Declared resources by address
    pub fn resources(&self) -> BTreeMap<Address, Attributes> {
        flatten(&self.resource)
    }

    /// Declared data sources by address
    pub fn data_sources(&self) -> BTreeMap<Address, Attributes> {
        flatten(&self.data)
    }
}

fn flatten(declarations: &Declarations) -> BTreeMap<Address, Attributes> {
    declarations
        .iter()
        .flat_map(|(kind, named)| {
            named
                .iter()
                .map(move |(name, attrs)| (Address::new(kind, name), attrs.clone()))
        })
        .collect()
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Resolve the provider block into a client configuration.
///
/// Unset or empty values fall back to the environment through `env`;
/// `api_url` finally falls back to the local default.
pub fn client_config<F>(schema: &Schema, block: &Attributes, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = block.clone();
    fill_from_env(&mut resolved, "api_url", ENV_API_URL, &env);
    fill_from_env(&mut resolved, "api_token", ENV_API_TOKEN, &env);

    let resolved = schema.normalize(&resolved);
    schema
        .validate(&resolved)
        .with_context(|| format!("Invalid provider configuration (set api_token or {ENV_API_TOKEN})"))?;

    let url = resolved
        .get("api_url")
        .and_then(AttrValue::as_str)
        .unwrap_or(DEFAULT_API_URL);
    let token = resolved
        .get("api_token")
        .and_then(AttrValue::as_str)
        .unwrap_or_default();

    log::debug!("Using Mock API Studio at {url}");
    Ok(ClientConfig::new(url, token))
}

fn fill_from_env<F>(attrs: &mut Attributes, name: &str, var: &str, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let unset = attrs.get(name).is_none_or(AttrValue::is_empty_string);
    if !unset {
        return;
    }
    if let Some(value) = env(var).filter(|v| !v.is_empty()) {
        log::debug!("Using {name} from {var}");
        attrs.insert(name.to_string(), AttrValue::String(value));
    }
}

/// Look variables up in the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ============================================================================
// Tests
// ============================================================================
