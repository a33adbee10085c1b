//! Node types and core node functionality

use serde::Serialize;

use super::port::{Port, PortId, PortType};
use super::property::PropertyBag;
use crate::host::Value;

/// Unique identifier for a node
pub type NodeId = usize;

/// A shader node: a type token, its sockets and its attributes
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// Type token, e.g. `ShaderNodeTexImage`
    pub node_type: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub properties: PropertyBag,
}

impl Node {
    /// Creates a new node without sockets
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            inputs: vec![],
            outputs: vec![],
            properties: PropertyBag::new().with("label", Value::Text(String::new())),
        }
    }

    /// Adds an input port to the node
    pub fn add_input(&mut self, name: impl Into<String>) -> &mut Self {
        let port_id = self.inputs.len();
        self.inputs.push(Port::new(port_id, name, PortType::Input));
        self
    }

    /// Adds an input port carrying a default value
    pub fn add_input_with_default(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        let port_id = self.inputs.len();
        self.inputs
            .push(Port::new(port_id, name, PortType::Input).with_default(value));
        self
    }

    /// Adds an output port to the node
    pub fn add_output(&mut self, name: impl Into<String>) -> &mut Self {
        let port_id = self.outputs.len();
        self.outputs.push(Port::new(port_id, name, PortType::Output));
        self
    }

    /// Replaces the node's attributes
    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn input_index(&self, name: &str) -> Option<PortId> {
        self.inputs.iter().position(|port| port.name == name)
    }

    pub fn output_index(&self, name: &str) -> Option<PortId> {
        self.outputs.iter().position(|port| port.name == name)
    }

    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|port| port.name == name)
    }

    pub fn ports(&self, port_type: PortType) -> &[Port] {
        match port_type {
            PortType::Input => &self.inputs,
            PortType::Output => &self.outputs,
        }
    }

    pub fn ports_mut(&mut self, port_type: PortType) -> &mut [Port] {
        match port_type {
            PortType::Input => &mut self.inputs,
            PortType::Output => &mut self.outputs,
        }
    }
}
