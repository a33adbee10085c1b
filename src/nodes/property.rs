//! Named attribute storage for nodes, sockets and images

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{HostError, HostResult};
use crate::host::Value;

/// A single attribute slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Property {
    /// Declared but not yet assigned; accepts any value kind
    Unset,
    Value(Value),
    /// Nested attribute block, e.g. `colorspace_settings`
    Group(PropertyBag),
}

/// Attributes keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: BTreeMap<String, Property>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute with an initial value
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.entries.insert(name.to_string(), Property::Value(value));
        self
    }

    /// Declare an attribute without a value
    pub fn with_unset(mut self, name: &str) -> Self {
        self.entries.insert(name.to_string(), Property::Unset);
        self
    }

    /// Declare a nested attribute block
    pub fn with_group(mut self, name: &str, group: PropertyBag) -> Self {
        self.entries.insert(name.to_string(), Property::Group(group));
        self
    }

    /// Copy every attribute of `other` into this bag, overwriting on conflict
    pub fn extend(&mut self, other: &PropertyBag) {
        for (name, property) in &other.entries {
            self.entries.insert(name.clone(), property.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    /// Assigned value of an attribute
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name) {
            Some(Property::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Nested block reached by following `path`
    pub fn group(&self, path: &[String]) -> Option<&PropertyBag> {
        path.iter().try_fold(self, |bag, name| match bag.entries.get(name) {
            Some(Property::Group(group)) => Some(group),
            _ => None,
        })
    }

    pub fn group_mut(&mut self, path: &[String]) -> Option<&mut PropertyBag> {
        path.iter().try_fold(self, |bag, name| match bag.entries.get_mut(name) {
            Some(Property::Group(group)) => Some(group),
            _ => None,
        })
    }

    /// Assign a declared attribute. The value kind must match what is already
    /// stored; unset attributes accept any kind.
    pub fn assign(&mut self, name: &str, value: &Value) -> HostResult<()> {
        let slot = self
            .entries
            .get_mut(name)
            .ok_or_else(|| HostError::NoSuchAttribute(name.to_string()))?;

        match slot {
            Property::Unset => {}
            Property::Value(current) => {
                let compatible = match (&*current, value) {
                    (Value::Vector(a), Value::Vector(b)) => a.len() == b.len(),
                    (current, value) => current.kind() == value.kind(),
                };
                if !compatible {
                    return Err(HostError::TypeMismatch {
                        attribute: name.to_string(),
                        expected: current.kind(),
                        found: value.kind(),
                    });
                }
            }
            Property::Group(_) => {
                return Err(HostError::TypeMismatch {
                    attribute: name.to_string(),
                    expected: "attribute group",
                    found: value.kind(),
                })
            }
        }

        *slot = Property::Value(value.clone());
        Ok(())
    }
}
