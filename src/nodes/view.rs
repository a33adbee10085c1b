//! [`GraphHost`] over an in-memory material graph

use std::path::Path;

use log::debug;

use super::cache::ImageCache;
use super::factory::NodeRegistry;
use super::graph::NodeGraph;
use super::node::NodeId;
use super::port::{PortId, PortType};
use super::property::{Property, PropertyBag};
use crate::error::{HostError, HostResult, SocketDirection};
use crate::host::{GraphHost, Link, ResourceHandle, Value};
use crate::template::PathIndex;

/// Attribute cursor into a material graph.
///
/// `path` lists the attribute groups entered below the owning object.
#[derive(Debug, Clone, PartialEq)]
pub enum HostObject {
    Node { node: NodeId, path: Vec<String> },
    /// The `inputs` or `outputs` collection of a node
    Sockets { node: NodeId, direction: PortType },
    Socket {
        node: NodeId,
        direction: PortType,
        port: PortId,
        path: Vec<String>,
    },
    Image { image: ResourceHandle, path: Vec<String> },
}

impl HostObject {
    fn entered(&self, name: &str) -> Self {
        let mut next = self.clone();
        match &mut next {
            HostObject::Node { path, .. }
            | HostObject::Socket { path, .. }
            | HostObject::Image { path, .. } => path.push(name.to_string()),
            HostObject::Sockets { .. } => {}
        }
        next
    }
}

/// One material's node graph, borrowed together with the scene resources
/// needed to create nodes and load images
pub struct MaterialGraph<'a> {
    pub graph: &'a mut NodeGraph,
    pub registry: &'a NodeRegistry,
    pub images: &'a mut ImageCache,
}

impl<'a> MaterialGraph<'a> {
    pub fn new(
        graph: &'a mut NodeGraph,
        registry: &'a NodeRegistry,
        images: &'a mut ImageCache,
    ) -> Self {
        Self {
            graph,
            registry,
            images,
        }
    }

    fn bag(&self, object: &HostObject) -> Option<&PropertyBag> {
        match object {
            HostObject::Node { node, path } => self.graph.node(*node)?.properties.group(path),
            HostObject::Socket {
                node,
                direction,
                port,
                path,
            } => self
                .graph
                .node(*node)?
                .ports(*direction)
                .get(*port)?
                .properties
                .group(path),
            HostObject::Image { image, path } => self.images.get(*image)?.properties.group(path),
            HostObject::Sockets { .. } => None,
        }
    }

    fn bag_mut(&mut self, object: &HostObject) -> Option<&mut PropertyBag> {
        match object {
            HostObject::Node { node, path } => {
                self.graph.node_mut(*node)?.properties.group_mut(path)
            }
            HostObject::Socket {
                node,
                direction,
                port,
                path,
            } => self
                .graph
                .node_mut(*node)?
                .ports_mut(*direction)
                .get_mut(*port)?
                .properties
                .group_mut(path),
            HostObject::Image { image, path } => {
                self.images.get_mut(*image)?.properties.group_mut(path)
            }
            HostObject::Sockets { .. } => None,
        }
    }

    fn missing_node(node: NodeId) -> HostError {
        HostError::NoSuchNode(node.to_string())
    }
}

impl GraphHost for MaterialGraph<'_> {
    type Node = NodeId;
    type Object = HostObject;

    fn output_node(&self, output_type: &str) -> Option<NodeId> {
        self.graph.nodes_of_type(output_type).next().map(|node| node.id)
    }

    fn node_type(&self, node: NodeId) -> Option<&str> {
        self.graph.node(node).map(|node| node.node_type.as_str())
    }

    fn input_names(&self, node: NodeId) -> Vec<String> {
        self.graph
            .node(node)
            .map(|node| node.inputs.iter().map(|port| port.name.clone()).collect())
            .unwrap_or_default()
    }

    fn has_input(&self, node: NodeId, socket: &str) -> bool {
        self.graph
            .node(node)
            .is_some_and(|node| node.input_index(socket).is_some())
    }

    fn has_output(&self, node: NodeId, socket: &str) -> bool {
        self.graph
            .node(node)
            .is_some_and(|node| node.output_index(socket).is_some())
    }

    fn input_link(&self, node: NodeId, socket: &str) -> Option<Link<NodeId>> {
        let port = self.graph.node(node)?.input_index(socket)?;
        let connection = self.graph.input_connection(node, port)?;
        let source = self.graph.node(connection.from_node)?;
        Some(Link {
            from_node: connection.from_node,
            from_socket: source.outputs.get(connection.from_port)?.name.clone(),
        })
    }

    fn create_node(&mut self, node_type: &str) -> HostResult<NodeId> {
        let node = self
            .registry
            .create_node(node_type)
            .ok_or_else(|| HostError::UnknownNodeType(node_type.to_string()))?;
        let id = self.graph.add_node(node);
        debug!("Created node {} ({})", id, node_type);
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, output: &str, to: NodeId, input: &str) -> HostResult<()> {
        let source = self.graph.node(from).ok_or_else(|| Self::missing_node(from))?;
        let from_port = source.output_index(output).ok_or_else(|| HostError::NoSuchSocket {
            node_type: source.node_type.clone(),
            socket: output.to_string(),
            direction: SocketDirection::Output,
        })?;

        let target = self.graph.node(to).ok_or_else(|| Self::missing_node(to))?;
        let to_port = target.input_index(input).ok_or_else(|| HostError::NoSuchSocket {
            node_type: target.node_type.clone(),
            socket: input.to_string(),
            direction: SocketDirection::Input,
        })?;

        self.graph
            .add_connection_by_ids(from, from_port, to, to_port)
            .map_err(|reason| HostError::InvalidLink(reason.to_string()))
    }

    fn remove_node(&mut self, node: NodeId) -> HostResult<()> {
        self.graph
            .remove_node(node)
            .map(|_| ())
            .ok_or_else(|| Self::missing_node(node))
    }

    fn load_image(&mut self, path: &Path) -> HostResult<ResourceHandle> {
        self.images.load(path)
    }

    fn node_object(&self, node: NodeId) -> HostObject {
        HostObject::Node { node, path: vec![] }
    }

    fn get_attr(&self, object: &HostObject, name: &str) -> Option<HostObject> {
        if let HostObject::Node { node, path } = object {
            if path.is_empty() {
                let direction = match name {
                    "inputs" => Some(PortType::Input),
                    "outputs" => Some(PortType::Output),
                    _ => None,
                };
                if let Some(direction) = direction {
                    self.graph.node(*node)?;
                    return Some(HostObject::Sockets {
                        node: *node,
                        direction,
                    });
                }
            }
        }

        match self.bag(object)?.get(name)? {
            Property::Group(_) => Some(object.entered(name)),
            Property::Value(Value::Resource(image)) => {
                self.images.get(*image)?;
                Some(HostObject::Image {
                    image: *image,
                    path: vec![],
                })
            }
            Property::Value(_) | Property::Unset => None,
        }
    }

    fn get_item(&self, object: &HostObject, index: &PathIndex) -> Option<HostObject> {
        let HostObject::Sockets { node, direction } = object else {
            return None;
        };
        let ports = self.graph.node(*node)?.ports(*direction);
        let port = match index {
            PathIndex::Position(position) => ports.get(*position)?.id,
            PathIndex::Key(key) => ports.iter().find(|port| &port.name == key)?.id,
        };
        Some(HostObject::Socket {
            node: *node,
            direction: *direction,
            port,
            path: vec![],
        })
    }

    fn set_attr(&mut self, object: &HostObject, name: &str, value: &Value) -> HostResult<()> {
        if let Value::Resource(image) = value {
            if self.images.get(*image).is_none() {
                return Err(HostError::TypeMismatch {
                    attribute: name.to_string(),
                    expected: "loaded image",
                    found: value.kind(),
                });
            }
        }

        let bag = self
            .bag_mut(object)
            .ok_or_else(|| HostError::NoSuchAttribute(name.to_string()))?;
        bag.assign(name, value)
    }

    fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }
}
