//! Registry of resource and data source definitions

use crate::error::{Error, Result};
use crate::resource::{DataSourceDefinition, ResourceDefinition};
use crate::schema::Schema;
use std::collections::BTreeMap;

/// All kinds a provider serves, plus the schema of its configuration block
pub struct Provider<C> {
    pub name: &'static str,
    pub config_schema: Schema,
    resources: BTreeMap<&'static str, ResourceDefinition<C>>,
    data_sources: BTreeMap<&'static str, DataSourceDefinition<C>>,
}

impl<C> Provider<C> {
    pub fn new(name: &'static str, config_schema: Schema) -> Self {
        Self {
            name,
            config_schema,
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        }
    }

    pub fn with_resource(mut self, definition: ResourceDefinition<C>) -> Self {
        self.resources.insert(definition.kind, definition);
        self
    }

    pub fn with_data_source(mut self, definition: DataSourceDefinition<C>) -> Self {
        self.data_sources.insert(definition.kind, definition);
        self
    }

    pub fn resource(&self, kind: &str) -> Result<&ResourceDefinition<C>> {
        self.resources
            .get(kind)
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))
    }

    pub fn data_source(&self, kind: &str) -> Result<&DataSourceDefinition<C>> {
        self.data_sources
            .get(kind)
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))
    }

    /// Resource definitions, ordered by kind
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition<C>> {
        self.resources.values()
    }

    /// Data source definitions, ordered by kind
    pub fn data_sources(&self) -> impl Iterator<Item = &DataSourceDefinition<C>> {
        self.data_sources.values()
    }
}
