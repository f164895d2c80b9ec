//! Workspace and API lookups by slug.
//!
//! The service has no lookup-by-slug route, so both reads return the
//! declared arguments unchanged and populate nothing.

use declarative::{Attribute, DataSourceDefinition, ResourceData, Result, Schema};
use mockapi_client::Client;

pub fn workspace() -> DataSourceDefinition<Client> {
    DataSourceDefinition {
        kind: super::workspace::KIND,
        description: "Look up a workspace by slug",
        schema: by_slug(),
        read: lookup,
    }
}

pub fn api() -> DataSourceDefinition<Client> {
    DataSourceDefinition {
        kind: super::api::KIND,
        description: "Look up an API definition by slug",
        schema: by_slug(),
        read: lookup,
    }
}

fn by_slug() -> Schema {
    Schema::new(vec![Attribute::string("slug").required()])
}

fn lookup(_: &Client, data: &mut ResourceData) -> Result<()> {
    log::debug!(
        "Lookup of slug {} returns no results",
        data.str_or_default("slug")
    );
    Ok(())
}
