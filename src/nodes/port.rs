//! Port types and functionality for node connections

use serde::Serialize;

use super::property::PropertyBag;
use crate::host::Value;

/// Index of a port within its node's inputs or outputs
pub type PortId = usize;

/// Type of port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortType {
    Input,
    Output,
}

/// Represents a named socket on a node
#[derive(Debug, Clone, Serialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub port_type: PortType,
    /// Socket attributes such as `default_value`
    pub properties: PropertyBag,
}

impl Port {
    /// Creates a new port
    pub fn new(id: PortId, name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id,
            name: name.into(),
            port_type,
            properties: PropertyBag::new().with("hide", Value::Bool(false)),
        }
    }

    /// Creates an input port with a default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.properties = self.properties.with("default_value", value);
        self
    }

    /// Unconnected value of an input socket
    pub fn default_value(&self) -> Option<&Value> {
        self.properties.value("default_value")
    }
}
