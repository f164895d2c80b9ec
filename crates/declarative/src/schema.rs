//! Attribute schemas
//!
//! A [`Schema`] lists every attribute a kind accepts, with its type,
//! whether it must be declared, whether it can change in place, and the
//! value it takes when left out. The planner and the driver both read
//! mutability from here, so one table decides update versus replace.

use crate::error::{Error, Result};
use crate::types::{AttrValue, Attributes};
use serde::Serialize;
use std::collections::BTreeSet;

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Int,
    Bool,
}

impl AttrType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }

    fn accepts(self, value: &AttrValue) -> bool {
        matches!(
            (self, value),
            (Self::String, AttrValue::String(_))
                | (Self::Int, AttrValue::Int(_))
                | (Self::Bool, AttrValue::Bool(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    /// Changes are applied in place
    Mutable,
    /// Any change destroys and recreates the instance
    Immutable,
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttrType,
    pub presence: Presence,
    pub mutability: Mutability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Optional,
            mutability: Mutability::Mutable,
            default: None,
            sensitive: false,
            description: "",
        }
    }

    /// Optional, mutable string attribute
    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttrType::String)
    }

    /// Optional, mutable integer attribute
    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttrType::Int)
    }

    /// Optional, mutable boolean attribute
    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttrType::Bool)
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutability = Mutability::Immutable;
        self
    }

    pub fn default_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    pub fn is_immutable(&self) -> bool {
        self.mutability == Mutability::Immutable
    }
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

/// Ordered set of attributes for one kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Whether changing `name` forces replacement. Unknown names are
    /// treated as immutable.
    pub fn is_immutable(&self, name: &str) -> bool {
        self.get(name).is_none_or(Attribute::is_immutable)
    }

    /// Validate a complete set of declared attributes
    pub fn validate(&self, attributes: &Attributes) -> Result<()> {
        self.validate_partial(attributes, &BTreeSet::new())
    }

    /// Validate declared attributes, accepting `unknown` names as present
    /// with a value that is not known yet.
    ///
    /// A required string declared as `""` counts as missing.
    pub fn validate_partial(
        &self,
        attributes: &Attributes,
        unknown: &BTreeSet<String>,
    ) -> Result<()> {
        for (name, value) in attributes {
            let attribute = self
                .get(name)
                .ok_or_else(|| Error::UnknownAttribute(name.clone()))?;
            if !attribute.ty.accepts(value) {
                return Err(Error::TypeMismatch {
                    name: name.clone(),
                    expected: attribute.ty.name(),
                    found: value.type_name(),
                });
            }
        }

        for name in unknown {
            if self.get(name).is_none() {
                return Err(Error::UnknownAttribute(name.clone()));
            }
        }

        for attribute in self.attributes.iter().filter(|a| a.is_required()) {
            if unknown.contains(attribute.name) {
                continue;
            }
            match attributes.get(attribute.name) {
                Some(value) if !value.is_empty_string() => {}
                _ => return Err(Error::MissingAttribute(attribute.name.to_string())),
            }
        }

        Ok(())
    }

    /// Fill defaults for attributes that are absent or declared as `""`
    pub fn normalize(&self, attributes: &Attributes) -> Attributes {
        let mut out = attributes.clone();
        for attribute in &self.attributes {
            let Some(default) = &attribute.default else {
                continue;
            };
            let missing = out.get(attribute.name).is_none_or(AttrValue::is_empty_string);
            if missing {
                out.insert(attribute.name.to_string(), default.clone());
            }
        }
        out
    }

    /// Names of attributes marked sensitive
    pub fn sensitive_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|a| a.sensitive)
            .map(|a| a.name)
    }
}
