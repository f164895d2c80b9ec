//! Lifecycle driver
//!
//! Runs one lifecycle operation for one instance through its definition
//! record. Every write is followed by a read so tracked state reflects what
//! the remote actually stored. Failures come back as diagnostics alongside
//! the state the host should keep; nothing is retried.

use crate::diagnostic::{Diagnostic, has_errors};
use crate::error::Error;
use crate::provider::Provider;
use crate::resource::{ResourceData, ResourceDefinition};
use crate::types::{Address, Attributes, TrackedInstance};

/// State to keep after an operation, plus what went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// `None` means the instance is not tracked
    pub state: Option<TrackedInstance>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    fn tracked(state: Option<TrackedInstance>) -> Self {
        Self {
            state,
            diagnostics: Vec::new(),
        }
    }

    fn failed(state: Option<TrackedInstance>, address: &Address, err: &Error) -> Self {
        Self {
            state,
            diagnostics: vec![Diagnostic::from_error(err).with_address(address)],
        }
    }

    fn with(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Result of reading a data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataOutcome {
    pub id: Option<String>,
    pub attributes: Attributes,
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives definitions from one provider against one shared client
pub struct Driver<'a, C> {
    provider: &'a Provider<C>,
    client: &'a C,
}

impl<'a, C> Driver<'a, C> {
    pub fn new(provider: &'a Provider<C>, client: &'a C) -> Self {
        Self { provider, client }
    }

    pub fn provider(&self) -> &'a Provider<C> {
        self.provider
    }

    fn definition(&self, address: &Address) -> Result<&'a ResourceDefinition<C>, Outcome> {
        self.provider
            .resource(&address.kind)
            .map_err(|err| Outcome::failed(None, address, &err))
    }

    /// Create, then read back.
    ///
    /// If the read fails the instance is still tracked, marked tainted, so
    /// the remote object is not orphaned.
    pub fn create(
        &self,
        address: &Address,
        desired: &Attributes,
        dependencies: Vec<Address>,
    ) -> Outcome {
        let definition = match self.definition(address) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };

        let attributes = definition.schema.normalize(desired);
        if let Err(err) = definition.schema.validate(&attributes) {
            return Outcome::failed(None, address, &err);
        }

        let mut data = ResourceData::new(attributes);
        log::debug!("Creating {address}");
        if let Err(err) = (definition.create)(self.client, &mut data) {
            log::debug!("Create of {address} failed: {err}");
            return Outcome::failed(None, address, &err);
        }

        let Some(id) = data.id().map(str::to_string) else {
            return Outcome::tracked(None).with(
                Diagnostic::warning(
                    "Instance not tracked",
                    "create did not assign an identifier",
                )
                .with_address(address),
            );
        };
        log::info!("Created {address} ({id})");

        let created = data.clone();
        match (definition.read)(self.client, &mut data) {
            Ok(()) => Outcome::tracked(
                data.into_instance(definition.kind, dependencies.clone())
                    .or_else(|| created.into_instance(definition.kind, dependencies)),
            ),
            Err(err) => {
                let mut instance = created.into_instance(definition.kind, dependencies);
                if let Some(instance) = instance.as_mut() {
                    instance.tainted = true;
                }
                Outcome::tracked(instance).with(
                    Diagnostic::error(
                        "Read after create failed",
                        format!(
                            "created with id {id} but could not be read back ({err}); \
                             tracked as tainted and will be replaced"
                        ),
                    )
                    .with_address(address),
                )
            }
        }
    }

    /// Refresh tracked attributes from the remote object.
    ///
    /// A not-found result clears the state; any other failure keeps it.
    pub fn read(&self, address: &Address, instance: &TrackedInstance) -> Outcome {
        let definition = match self.definition(address) {
            Ok(d) => d,
            Err(outcome) => return outcome.keeping(instance),
        };

        let mut data = ResourceData::from_instance(instance);
        match (definition.read)(self.client, &mut data) {
            Ok(()) => {
                let refreshed = data
                    .into_instance(definition.kind, instance.dependencies.clone())
                    .map(|mut refreshed| {
                        refreshed.tainted = instance.tainted;
                        refreshed
                    });
                if refreshed.is_none() {
                    return Self::gone(address, instance);
                }
                Outcome::tracked(refreshed)
            }
            Err(err) if err.is_not_found() => Self::gone(address, instance),
            Err(err) => Outcome::failed(Some(instance.clone()), address, &err),
        }
    }

    fn gone(address: &Address, instance: &TrackedInstance) -> Outcome {
        log::warn!("{address} ({}) no longer exists remotely", instance.id);
        Outcome::tracked(None).with(
            Diagnostic::warning(
                "Resource removed outside of management",
                format!(
                    "{} no longer exists remotely and was removed from state",
                    instance.id
                ),
            )
            .with_address(address),
        )
    }

    /// Update in place, then read back.
    ///
    /// Refuses without a remote call when the definition has no update or
    /// an immutable attribute would change. On any failure the prior state
    /// is kept.
    pub fn update(
        &self,
        address: &Address,
        prior: &TrackedInstance,
        desired: &Attributes,
        dependencies: Vec<Address>,
    ) -> Outcome {
        let definition = match self.definition(address) {
            Ok(d) => d,
            Err(outcome) => return outcome.keeping(prior),
        };
        let keep = || Some(prior.clone());

        let Some(update) = definition.update else {
            let err = Error::UpdateNotSupported {
                kind: definition.kind.to_string(),
            };
            return Outcome::failed(keep(), address, &err);
        };

        let attributes = definition.schema.normalize(desired);
        if let Err(err) = definition.schema.validate(&attributes) {
            return Outcome::failed(keep(), address, &err);
        }

        for attribute in definition.schema.iter().filter(|a| a.is_immutable()) {
            let before = prior.attributes.get(attribute.name);
            let after = attributes.get(attribute.name);
            if before.is_some() && after.is_some() && before != after {
                let err = Error::RequiresReplacement {
                    attribute: attribute.name.to_string(),
                };
                return Outcome::failed(keep(), address, &err);
            }
        }

        let mut data = ResourceData::from_instance(prior);
        data.merge(&attributes);
        log::debug!("Updating {address} ({})", prior.id);
        if let Err(err) = update(self.client, &mut data) {
            return Outcome::failed(keep(), address, &err);
        }

        if let Err(err) = (definition.read)(self.client, &mut data) {
            return Outcome::tracked(keep()).with(
                Diagnostic::error(
                    "Read after update failed",
                    format!("updated but could not be read back ({err}); state left unchanged"),
                )
                .with_address(address),
            );
        }

        log::info!("Updated {address} ({})", prior.id);
        Outcome::tracked(
            data.into_instance(definition.kind, dependencies)
                .or_else(keep),
        )
    }

    /// Delete the remote object. On failure the prior state is kept.
    pub fn delete(&self, address: &Address, prior: &TrackedInstance) -> Outcome {
        let definition = match self.definition(address) {
            Ok(d) => d,
            Err(outcome) => return outcome.keeping(prior),
        };

        let data = ResourceData::from_instance(prior);
        log::debug!("Deleting {address} ({})", prior.id);
        match (definition.delete)(self.client, &data) {
            Ok(()) => {
                log::info!("Deleted {address} ({})", prior.id);
                Outcome::tracked(None)
            }
            Err(err) => Outcome::failed(Some(prior.clone()), address, &err),
        }
    }

    /// Read a data source with the declared arguments
    pub fn read_data_source(&self, address: &Address, config: &Attributes) -> DataOutcome {
        let mut outcome = DataOutcome {
            id: None,
            attributes: config.clone(),
            diagnostics: Vec::new(),
        };

        let result = self.provider.data_source(&address.kind).and_then(|definition| {
            let attributes = definition.schema.normalize(config);
            definition.schema.validate(&attributes)?;
            let mut data = ResourceData::new(attributes);
            (definition.read)(self.client, &mut data)?;
            Ok(data)
        });

        match result {
            Ok(data) => {
                outcome.id = data.id().map(str::to_string);
                outcome.attributes = data.attributes().clone();
            }
            Err(err) => outcome
                .diagnostics
                .push(Diagnostic::from_error(&err).with_address(address)),
        }
        outcome
    }
}

impl Outcome {
    fn keeping(mut self, instance: &TrackedInstance) -> Self {
        self.state = Some(instance.clone());
        self
    }
}
