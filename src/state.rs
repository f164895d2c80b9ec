use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{Address, StateMap, TrackedInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// Tracked instances, persisted between runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderState {
    /// Last time the state was written
    pub last_updated: DateTime<Utc>,

    /// Tracked instances keyed by address (`kind.name`)
    #[serde(default)]
    pub instances: BTreeMap<String, TrackedInstance>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            instances: BTreeMap::new(),
        }
    }
}

// ============================================================================
// ProviderState Implementation
// ============================================================================

impl ProviderState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded {} tracked instances from {}",
            state.instances.len(),
            path.display()
        );
        Ok(state)
    }

    /// Save state to disk, stamping `last_updated`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Tracked instances keyed by parsed address
    pub fn to_map(&self) -> Result<StateMap> {
        self.instances
            .iter()
            .map(|(key, instance)| {
                let address = Address::parse(key)
                    .with_context(|| format!("Invalid address in state file: {key}"))?;
                if address.kind != instance.kind {
                    anyhow::bail!(
                        "State entry {key} records kind {}, expected {}",
                        instance.kind,
                        address.kind
                    );
                }
                Ok((address, instance.clone()))
            })
            .collect()
    }

    /// Replace tracked instances with `map`
    pub fn set_map(&mut self, map: &StateMap) {
        self.instances = map
            .iter()
            .map(|(address, instance)| (address.to_string(), instance.clone()))
            .collect();
    }
}

// ============================================================================
// Tests
// ============================================================================
