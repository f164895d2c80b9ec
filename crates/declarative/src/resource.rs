//! Resource and data source definitions
//!
//! A definition is a plain record: a schema plus one function per
//! lifecycle step. The driver calls through the record and never looks at
//! the kind name, so adding a kind means registering one more record.
//!
//! # Example
//!
//! ```
//! use declarative::{Attribute, ResourceData, ResourceDefinition, Result, Schema};
//!
//! struct Client;
//!
//! fn create(_: &Client, data: &mut ResourceData) -> Result<()> {
//!     let name = data.require_str("name")?.to_string();
//!     data.set_id(format!("note-{name}"));
//!     Ok(())
//! }
//!
//! fn read(_: &Client, _: &mut ResourceData) -> Result<()> {
//!     Ok(())
//! }
//!
//! fn delete(_: &Client, _: &ResourceData) -> Result<()> {
//!     Ok(())
//! }
//!
//! let note = ResourceDefinition::<Client> {
//!     kind: "note",
//!     description: "A note",
//!     schema: Schema::new(vec![Attribute::string("name").required().immutable()]),
//!     create,
//!     read,
//!     update: None,
//!     delete,
//! };
//! assert!(note.schema.is_immutable("name"));
//! ```

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::{Address, AttrValue, Attributes, TrackedInstance};

/// Working copy of one instance handed to lifecycle functions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceData {
    id: Option<String>,
    attributes: Attributes,
}

impl ResourceData {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    pub fn from_instance(instance: &TrackedInstance) -> Self {
        Self {
            id: Some(instance.id.clone()),
            attributes: instance.attributes.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The identifier, or an error if the instance was never created
    pub fn require_id(&self) -> Result<&str> {
        self.id()
            .ok_or_else(|| Error::Invalid("instance has no identifier".to_string()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_int)
    }

    /// String value, or `""` when absent
    pub fn str_or_default(&self, name: &str) -> String {
        self.get_str(name).unwrap_or_default().to_string()
    }

    /// A string that must be present and non-empty
    pub fn require_str(&self, name: &str) -> Result<&str> {
        match self.get_str(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::MissingAttribute(name.to_string())),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Set from a remote field; `None` keeps the current value
    pub fn set_opt<V: Into<AttrValue>>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Overlay `attributes` on the current values
    pub fn merge(&mut self, attributes: &Attributes) {
        for (name, value) in attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
    }

    /// Convert to tracked state; `None` if no identifier was assigned
    pub fn into_instance(self, kind: &str, dependencies: Vec<Address>) -> Option<TrackedInstance> {
        let id = self.id.filter(|id| !id.is_empty())?;
        Some(TrackedInstance {
            kind: kind.to_string(),
            id,
            attributes: self.attributes,
            tainted: false,
            dependencies,
        })
    }
}

/// Lifecycle step that may change the working copy
pub type LifecycleFn<C> = fn(&C, &mut ResourceData) -> Result<()>;

/// Remote delete
pub type DeleteFn<C> = fn(&C, &ResourceData) -> Result<()>;

/// A managed resource kind
pub struct ResourceDefinition<C> {
    pub kind: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    /// Create the remote object and set the id
    pub create: LifecycleFn<C>,
    /// Refresh attributes from the remote object
    pub read: LifecycleFn<C>,
    /// In-place update of mutable attributes; `None` means every change
    /// replaces the instance
    pub update: Option<LifecycleFn<C>>,
    pub delete: DeleteFn<C>,
}

/// A read-only data source kind
pub struct DataSourceDefinition<C> {
    pub kind: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    pub read: LifecycleFn<C>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attributes;

    #[test]
    fn test_set_opt_keeps_value_when_absent() {
        let mut data = ResourceData::new(attributes([("slug", AttrValue::from("team-a"))]));
        data.set_opt::<String>("slug", None);
        assert_eq!(data.get_str("slug"), Some("team-a"));
        data.set_opt("slug", Some("team-b"));
        assert_eq!(data.get_str("slug"), Some("team-b"));
    }

    #[test]
    fn test_require_str_rejects_empty() {
        let data = ResourceData::new(attributes([("api_id", AttrValue::from(""))]));
        assert!(matches!(
            data.require_str("api_id"),
            Err(Error::MissingAttribute(name)) if name == "api_id"
        ));
        assert_eq!(data.str_or_default("missing"), "");
    }

    #[test]
    fn test_into_instance_requires_id() {
        let data = ResourceData::new(Attributes::new());
        assert!(data.into_instance("kind", vec![]).is_none());

        let mut data = ResourceData::new(Attributes::new());
        data.set_id("");
        assert!(data.require_id().is_err());
        data.set_id("ws-1");
        let instance = data.into_instance("kind", vec![]).unwrap();
        assert_eq!(instance.id, "ws-1");
        assert!(!instance.tainted);
    }
}
