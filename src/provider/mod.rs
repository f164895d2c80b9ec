//! Mock API Studio resource and data source definitions
//!
//! Each kind is a [`ResourceDefinition`] record: a schema plus one function
//! per lifecycle step, all taking the shared [`Client`]. The driver never
//! looks at kind names; everything it needs is in the record.

pub mod api;
pub mod data_sources;
pub mod endpoint;
pub mod webhook;
pub mod workspace;

use declarative::{Attribute, Error, Provider, Schema};
use mockapi_client::{Client, DEFAULT_API_URL};

/// Provider name used in diagnostics and the schema dump
pub const NAME: &str = "mock_api_studio";

/// Schema of the `[provider]` block
pub fn config_schema() -> Schema {
    Schema::new(vec![
        Attribute::string("api_url")
            .default_value(DEFAULT_API_URL)
            .describe("Mock API Studio server URL"),
        Attribute::string("api_token")
            .required()
            .sensitive()
            .describe("API authentication token"),
    ])
}

/// Every resource and data source this provider manages
pub fn provider() -> Provider<Client> {
    Provider::new(NAME, config_schema())
        .with_resource(workspace::definition())
        .with_resource(api::definition())
        .with_resource(endpoint::definition())
        .with_resource(webhook::definition())
        .with_data_source(data_sources::workspace())
        .with_data_source(data_sources::api())
}

/// Map a client failure onto a definition error.
///
/// A 404 means the object is gone; everything else keeps the client's
/// category as the diagnostic summary.
pub fn remote_error(err: mockapi_client::Error) -> Error {
    if err.is_not_found() {
        return Error::NotFound;
    }
    Error::remote(err.category().description(), err.to_string())
}
