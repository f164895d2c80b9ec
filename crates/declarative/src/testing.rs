//! In-memory remote used by the driver and executor tests

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::resource::{DataSourceDefinition, ResourceData, ResourceDefinition};
use crate::schema::{Attribute, Schema};
use crate::types::Attributes;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

/// Stores notes and tags by id and records every call
#[derive(Default)]
pub struct Remote {
    pub objects: RefCell<BTreeMap<String, Attributes>>,
    pub calls: RefCell<Vec<&'static str>>,
    pub failing: RefCell<BTreeSet<&'static str>>,
    pub skip_id: Cell<bool>,
    next: Cell<u32>,
}

impl Remote {
    fn call(&self, op: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(op);
        if self.failing.borrow().contains(op) {
            return Err(Error::remote(
                "Remote request failed",
                format!("{op} failed"),
            ));
        }
        Ok(())
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

fn create(remote: &Remote, data: &mut ResourceData) -> Result<()> {
    remote.call("create")?;
    if remote.skip_id.get() {
        return Ok(());
    }
    remote.next.set(remote.next.get() + 1);
    let id = format!("n-{}", remote.next.get());
    let mut stored = data.attributes().clone();
    // Titles come back upper-cased
    if let Some(title) = data.get_str("title") {
        stored.insert("title".into(), title.to_uppercase().into());
    }
    remote.objects.borrow_mut().insert(id.clone(), stored);
    data.set_id(id);
    Ok(())
}

fn read(remote: &Remote, data: &mut ResourceData) -> Result<()> {
    remote.call("read")?;
    let id = data.require_id()?.to_string();
    let objects = remote.objects.borrow();
    let stored = objects.get(&id).ok_or(Error::NotFound)?;
    for (name, value) in stored {
        data.set(name, value.clone());
    }
    Ok(())
}

fn update(remote: &Remote, data: &mut ResourceData) -> Result<()> {
    remote.call("update")?;
    let id = data.require_id()?.to_string();
    remote
        .objects
        .borrow_mut()
        .insert(id, data.attributes().clone());
    Ok(())
}

fn delete(remote: &Remote, data: &ResourceData) -> Result<()> {
    remote.call("delete")?;
    let id = data.require_id()?;
    remote
        .objects
        .borrow_mut()
        .remove(id)
        .map(drop)
        .ok_or(Error::NotFound)
}

fn lookup(_: &Remote, _: &mut ResourceData) -> Result<()> {
    Ok(())
}

/// `note` (updatable) and `tag` (child of a note, replace-only)
pub fn provider() -> Provider<Remote> {
    Provider::new("notes", Schema::default())
        .with_resource(ResourceDefinition {
            kind: "note",
            description: "A note",
            schema: Schema::new(vec![
                Attribute::string("title").required(),
                Attribute::string("slug").required().immutable(),
                Attribute::string("body").default_value(""),
                Attribute::int("priority").immutable().default_value(3_i64),
            ]),
            create,
            read,
            update: Some(update),
            delete,
        })
        .with_resource(ResourceDefinition {
            kind: "tag",
            description: "A label on a note",
            schema: Schema::new(vec![
                Attribute::string("note_id").required().immutable(),
                Attribute::string("label").required().immutable(),
            ]),
            create,
            read,
            update: None,
            delete,
        })
        .with_data_source(DataSourceDefinition {
            kind: "note",
            description: "Look up a note",
            schema: Schema::new(vec![Attribute::string("slug").required()]),
            read: lookup,
        })
}
