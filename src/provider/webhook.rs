//! `mock_api_studio_webhook`: declared so manifests can carry it, but the
//! service exposes no webhook routes yet. Every callback succeeds without a
//! remote call; create assigns no identifier, so nothing is ever tracked.

use declarative::{Attribute, ResourceData, ResourceDefinition, Result, Schema};
use mockapi_client::Client;

pub const KIND: &str = "mock_api_studio_webhook";

pub fn definition() -> ResourceDefinition<Client> {
    ResourceDefinition {
        kind: KIND,
        description: "A workspace webhook (not yet backed by the service)",
        schema: Schema::new(vec![
            Attribute::string("workspace_id")
                .required()
                .immutable()
                .describe("Identifier of the parent workspace"),
        ]),
        create: noop,
        read: noop,
        update: None,
        delete: noop_delete,
    }
}

fn noop(_: &Client, _: &mut ResourceData) -> Result<()> {
    log::debug!("Webhook callbacks are not implemented by the service");
    Ok(())
}

fn noop_delete(_: &Client, _: &ResourceData) -> Result<()> {
    Ok(())
}
