//! Command implementations
//!
//! Every command except `schema` and `completions` works on a [`Session`]:
//! the manifest, a configured client and the tracked state.

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod refresh;
pub mod schema;
pub mod show;

use anyhow::{Result, bail};
use declarative::{Driver, Provider, StateMap, has_errors};
use mockapi_client::Client;

use crate::Context;
use crate::config::{self, Manifest};
use crate::engine::{self, Declared, Planned};
use crate::provider;
use crate::state::ProviderState;
use crate::ui;

/// Everything a command needs to talk to the service
pub struct Session {
    pub manifest: Manifest,
    pub provider: Provider<Client>,
    pub client: Client,
    pub state: StateMap,
    stored: ProviderState,
}

impl Session {
    /// Load the manifest and state file and configure the client
    pub fn load(ctx: &Context) -> Result<Self> {
        let manifest = Manifest::load(&ctx.manifest)?;
        let provider = provider::provider();
        let client_config =
            config::client_config(&provider.config_schema, &manifest.provider, config::process_env)?;
        log::info!("Using Mock API Studio at {}", client_config.base_url());

        let stored = ProviderState::load(&ctx.state)?;
        let state = stored.to_map()?;

        Ok(Self {
            manifest,
            provider,
            client: Client::new(client_config),
            state,
            stored,
        })
    }

    /// Write the tracked state back to the state file
    pub fn save(&mut self, ctx: &Context) -> Result<()> {
        self.stored.set_map(&self.state);
        self.stored.save(&ctx.state)
    }

    /// Refresh tracked state and read data sources, printing diagnostics.
    ///
    /// Fails when a data source could not be read.
    pub fn refresh(&mut self, ctx: &Context) -> Result<()> {
        let driver = Driver::new(&self.provider, &self.client);

        if !ctx.quiet && !self.state.is_empty() {
            ui::dim(&format!("Refreshing {} tracked instances...", self.state.len()));
        }
        let diagnostics = engine::refresh(&driver, &mut self.state);
        ui::diagnostics(&diagnostics);

        let outcomes =
            engine::read_data_sources(&driver, &self.manifest.data_sources(), &self.state);
        let diagnostics: Vec<_> = outcomes
            .into_iter()
            .flat_map(|(_, outcome)| outcome.diagnostics)
            .collect();
        ui::diagnostics(&diagnostics);
        if has_errors(&diagnostics) {
            bail!("Failed to read data sources");
        }
        Ok(())
    }

    /// Plan the manifest against the (refreshed) tracked state
    pub fn plan(&self, target: Option<&str>) -> Result<(Declared, Planned)> {
        let declared = Declared::new(self.manifest.resources());
        let planned = engine::build_plan(&self.provider, &declared, &self.state)?.targeted(target);
        Ok((declared, planned))
    }
}
