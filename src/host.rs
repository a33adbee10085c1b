//! Graph host capability interface
//!
//! The synthesis engine never owns a shader graph. It reaches the live graph
//! only through [`GraphHost`], implemented by the embedding application (and by
//! the in-memory host in [`crate::nodes`]). Node handles are opaque and are
//! never cached across operations; every call re-discovers state by walking
//! the graph.

use std::fmt;
use std::hash::Hash;
use std::path::Path;

use serde::Serialize;

use crate::error::HostResult;
use crate::template::PathIndex;

/// Handle to an image resource owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceHandle(pub usize);

/// A value that can be written onto a host attribute.
///
/// Values are never coerced: the host accepts or rejects them as they are.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Fixed-size numeric vectors such as colors and locations
    Vector(Vec<f64>),
    Resource(ResourceHandle),
}

impl Value {
    /// Convert a JSON scalar (or array of numbers) into a value
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64())
                .collect::<Option<Vec<_>>>()
                .map(Value::Vector),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }

    /// Name of the value kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Vector(_) => "vector",
            Value::Resource(_) => "resource",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Vector(v) => write!(f, "{v:?}"),
            Value::Resource(handle) => write!(f, "<resource {}>", handle.0),
        }
    }
}

/// The link feeding an input socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<N> {
    pub from_node: N,
    pub from_socket: String,
}

/// Capabilities the synthesis engine needs from the shader graph it edits.
///
/// An input socket carries at most one incoming link. Mutations are visible
/// immediately to later calls; there are no transactions.
pub trait GraphHost {
    /// Opaque node handle, valid for the duration of one operation
    type Node: Copy + Eq + Hash + fmt::Debug;
    /// Cursor used to walk and assign dotted attribute paths
    type Object: Clone + fmt::Debug;

    /// First node of the given output type
    fn output_node(&self, output_type: &str) -> Option<Self::Node>;

    /// Concrete type token of a node
    fn node_type(&self, node: Self::Node) -> Option<&str>;

    /// Input socket names in declaration order
    fn input_names(&self, node: Self::Node) -> Vec<String>;

    fn has_input(&self, node: Self::Node, socket: &str) -> bool;

    fn has_output(&self, node: Self::Node, socket: &str) -> bool;

    /// The link currently feeding an input socket, if any
    fn input_link(&self, node: Self::Node, socket: &str) -> Option<Link<Self::Node>>;

    /// Create a node; the host graph owns it
    fn create_node(&mut self, node_type: &str) -> HostResult<Self::Node>;

    /// Link `from.output` into `to.input`, replacing any link already on that input
    fn connect(
        &mut self,
        from: Self::Node,
        output: &str,
        to: Self::Node,
        input: &str,
    ) -> HostResult<()>;

    /// Remove a node together with its own links
    fn remove_node(&mut self, node: Self::Node) -> HostResult<()>;

    /// Resolve an image by path; the same path always yields the same handle
    fn load_image(&mut self, path: &Path) -> HostResult<ResourceHandle>;

    /// Attribute cursor positioned on a node
    fn node_object(&self, node: Self::Node) -> Self::Object;

    /// Step into a named attribute
    fn get_attr(&self, object: &Self::Object, name: &str) -> Option<Self::Object>;

    /// Step into an element of a collection attribute
    fn get_item(&self, object: &Self::Object, index: &PathIndex) -> Option<Self::Object>;

    /// Assign a named attribute
    fn set_attr(&mut self, object: &Self::Object, name: &str, value: &Value) -> HostResult<()>;

    /// Number of nodes currently in the graph
    fn node_count(&self) -> usize;
}

/// The shader node: whatever feeds the output node's surface socket
pub fn find_shader_node<H: GraphHost>(
    host: &H,
    output_type: &str,
    surface_socket: &str,
) -> Option<H::Node> {
    let output = host.output_node(output_type)?;
    host.input_link(output, surface_socket)
        .map(|link| link.from_node)
}

/// Material storage of the embedding application.
///
/// The command layer only uses these capabilities; each material's graph is
/// reached through [`MaterialLibrary::host_mut`].
pub trait MaterialLibrary {
    /// Node handle shared by every material graph of the library
    type Node: Copy + Eq + Hash + fmt::Debug;
    type Host<'a>: GraphHost<Node = Self::Node>
    where
        Self: 'a;

    fn contains(&self, name: &str) -> bool;

    /// Material names in the host's order
    fn material_names(&self) -> Vec<String>;

    /// Create a material with the default output + shader pair. The host may
    /// adjust the name to keep it unique; the final name is returned.
    fn create_material(&mut self, name: &str) -> HostResult<String>;

    /// Rename a material, returning the final name
    fn rename_material(&mut self, name: &str, new_name: &str) -> HostResult<String>;

    fn remove_material(&mut self, name: &str) -> HostResult<()>;

    /// Number of objects referencing the material
    fn user_count(&self, name: &str) -> usize;

    /// Assign the material to every selected target, returning how many changed
    fn assign_to_selection(&mut self, name: &str) -> HostResult<usize>;

    fn host_mut(&mut self, name: &str) -> Option<Self::Host<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_from_json() {
        assert_eq!(Value::from_json(&json!(true)), Some(Value::Bool(true)));
        assert_eq!(Value::from_json(&json!(0.5)), Some(Value::Number(0.5)));
        assert_eq!(
            Value::from_json(&json!("Non-Color")),
            Some(Value::Text("Non-Color".to_string()))
        );
        assert_eq!(
            Value::from_json(&json!([1, 0.5, 0, 1])),
            Some(Value::Vector(vec![1.0, 0.5, 0.0, 1.0]))
        );
        assert_eq!(Value::from_json(&json!(null)), None);
        assert_eq!(Value::from_json(&json!({"a": 1})), None);
        assert_eq!(Value::from_json(&json!([1, "x"])), None);
    }
}
