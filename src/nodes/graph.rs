//! Node graph data structures and operations

use std::collections::BTreeMap;

use serde::Serialize;

use super::node::{Node, NodeId};
use super::port::PortId;

/// Represents a connection between two ports on different nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from_node: NodeId,
    pub from_port: PortId,
    pub to_node: NodeId,
    pub to_port: PortId,
}

impl Connection {
    /// Creates a new connection
    pub fn new(from_node: NodeId, from_port: PortId, to_node: NodeId, to_port: PortId) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }
}

/// A material's shader graph: nodes and the links between them.
///
/// Every input port carries at most one incoming connection.
#[derive(Debug, Clone, Serialize)]
pub struct NodeGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub connections: Vec<Connection>,
    next_node_id: NodeId,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            connections: Vec::new(),
            next_node_id: 0,
        }
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    /// Removes a node and all its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections
            .retain(|conn| conn.from_node != node_id && conn.to_node != node_id);

        self.nodes.remove(&node_id)
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Adds a connection, replacing whatever already feeds the target port
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), &'static str> {
        if connection.from_node == connection.to_node {
            return Err("Cannot connect a node to itself");
        }

        let source = self
            .nodes
            .get(&connection.from_node)
            .ok_or("Source node does not exist")?;
        if connection.from_port >= source.outputs.len() {
            return Err("Source port does not exist");
        }

        let target = self
            .nodes
            .get(&connection.to_node)
            .ok_or("Target node does not exist")?;
        if connection.to_port >= target.inputs.len() {
            return Err("Target port does not exist");
        }

        self.connections.retain(|conn| {
            !(conn.to_node == connection.to_node && conn.to_port == connection.to_port)
        });
        self.connections.push(connection);
        Ok(())
    }

    /// Helper method to add connection by node IDs and port indices
    pub fn add_connection_by_ids(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<(), &'static str> {
        self.add_connection(Connection::new(from_node, from_port, to_node, to_port))
    }

    /// The connection feeding an input port
    pub fn input_connection(&self, node_id: NodeId, port: PortId) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|conn| conn.to_node == node_id && conn.to_port == port)
    }

    /// Nodes of a type, in creation order
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |node| node.node_type == node_type)
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_type: &str, inputs: &[&str], outputs: &[&str]) -> Node {
        let mut node = Node::new(0, node_type);
        for input in inputs {
            node.add_input(*input);
        }
        for output in outputs {
            node.add_output(*output);
        }
        node
    }

    #[test]
    fn test_connection_replaces_existing_link() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(node("A", &[], &["Color"]));
        let b = graph.add_node(node("B", &[], &["Color"]));
        let shader = graph.add_node(node("Shader", &["Base Color"], &["BSDF"]));

        graph.add_connection_by_ids(a, 0, shader, 0).unwrap();
        graph.add_connection_by_ids(b, 0, shader, 0).unwrap();

        assert_eq!(graph.connections.len(), 1);
        assert_eq!(graph.input_connection(shader, 0).unwrap().from_node, b);
        // The previous producer stays in the graph.
        assert!(graph.node(a).is_some());
    }

    #[test]
    fn test_invalid_connections_are_rejected() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(node("A", &["In"], &["Out"]));
        let b = graph.add_node(node("B", &["In"], &["Out"]));

        assert!(graph.add_connection_by_ids(a, 0, a, 0).is_err());
        assert!(graph.add_connection_by_ids(a, 1, b, 0).is_err());
        assert!(graph.add_connection_by_ids(a, 0, b, 3).is_err());
        assert!(graph.add_connection_by_ids(a, 0, 42, 0).is_err());
    }

    #[test]
    fn test_remove_node_drops_its_links() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(node("A", &[], &["Out"]));
        let b = graph.add_node(node("B", &["In"], &["Out"]));
        let c = graph.add_node(node("C", &["In"], &[]));
        graph.add_connection_by_ids(a, 0, b, 0).unwrap();
        graph.add_connection_by_ids(b, 0, c, 0).unwrap();

        assert_eq!(graph.connections.len(), 2);
        graph.remove_node(b).unwrap();
        assert!(graph.connections.is_empty());
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes_of_type("A").count(), 1);
    }
}
