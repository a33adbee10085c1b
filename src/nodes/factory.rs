//! Node type registry: socket layouts and default attributes per type token

use std::collections::BTreeMap;

use log::debug;

use super::node::Node;
use super::property::PropertyBag;
use crate::constants::node;
use crate::host::Value;

/// Port definition for node creation
#[derive(Debug, Clone)]
pub struct PortDefinition {
    pub name: String,
    pub default_value: Option<Value>,
}

impl PortDefinition {
    /// A port without a default value (shader, vector or output sockets)
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_value: None,
        }
    }

    /// An input port holding a value while unconnected
    pub fn with_default(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            default_value: Some(value),
        }
    }
}

/// Everything needed to instantiate a node of one type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub node_type: String,
    pub description: String,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
    pub properties: PropertyBag,
}

impl NodeMetadata {
    pub fn new(node_type: &str, description: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            description: description.to_string(),
            inputs: vec![],
            outputs: vec![],
            properties: PropertyBag::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Output sockets by name
    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|name| PortDefinition::new(name)).collect();
        self
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    /// Instantiate a node; the graph assigns its id
    pub fn create(&self) -> Node {
        let mut node = Node::new(0, self.node_type.clone());
        for input in &self.inputs {
            match &input.default_value {
                Some(value) => node.add_input_with_default(&input.name, value.clone()),
                None => node.add_input(&input.name),
            };
        }
        for output in &self.outputs {
            node.add_output(&output.name);
        }

        let mut properties = node.properties.clone();
        properties.extend(&self.properties);
        node.with_properties(properties)
    }
}

/// Registry of node types the in-memory host can create
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    definitions: BTreeMap<String, NodeMetadata>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Registry holding the Blender shader node types templates refer to
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for metadata in builtin_nodes() {
            registry.register(metadata);
        }
        registry
    }

    /// Register (or replace) a node type
    pub fn register(&mut self, metadata: NodeMetadata) {
        debug!("Registering node type {}", metadata.node_type);
        self.definitions.insert(metadata.node_type.clone(), metadata);
    }

    /// Create a node by type name
    pub fn create_node(&self, node_type: &str) -> Option<Node> {
        self.definitions.get(node_type).map(NodeMetadata::create)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.definitions.contains_key(node_type)
    }

    pub fn metadata(&self, node_type: &str) -> Option<&NodeMetadata> {
        self.definitions.get(node_type)
    }

    /// Registered type tokens, sorted
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn rgba(r: f64, g: f64, b: f64, a: f64) -> Value {
    Value::Vector(vec![r, g, b, a])
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn builtin_nodes() -> Vec<NodeMetadata> {
    use PortDefinition as Port;

    vec![
        NodeMetadata::new(node::OUTPUT_MATERIAL, "Material output")
            .with_inputs(vec![
                Port::new(node::SURFACE_SOCKET),
                Port::new("Volume"),
                Port::with_default("Displacement", Value::Vector(vec![0.0, 0.0, 0.0])),
            ])
            .with_properties(
                PropertyBag::new()
                    .with("is_active_output", Value::Bool(true))
                    .with("target", text("ALL")),
            ),
        NodeMetadata::new(node::BSDF_PRINCIPLED, "Principled BSDF")
            .with_inputs(vec![
                Port::with_default("Base Color", rgba(0.8, 0.8, 0.8, 1.0)),
                Port::with_default("Metallic", Value::Number(0.0)),
                Port::with_default("Roughness", Value::Number(0.5)),
                Port::with_default("IOR", Value::Number(1.5)),
                Port::with_default("Alpha", Value::Number(1.0)),
                Port::new("Normal"),
                Port::with_default("Specular IOR Level", Value::Number(0.5)),
                Port::with_default("Emission Color", rgba(1.0, 1.0, 1.0, 1.0)),
                Port::with_default("Emission Strength", Value::Number(0.0)),
                Port::with_default("Coat Weight", Value::Number(0.0)),
            ])
            .with_outputs(&["BSDF"])
            .with_properties(
                PropertyBag::new()
                    .with("distribution", text("MULTI_GGX"))
                    .with("subsurface_method", text("RANDOM_WALK")),
            ),
        NodeMetadata::new(node::BSDF_GLASS, "Glass BSDF")
            .with_inputs(vec![
                Port::with_default("Color", rgba(1.0, 1.0, 1.0, 1.0)),
                Port::with_default("Roughness", Value::Number(0.0)),
                Port::with_default("IOR", Value::Number(1.45)),
                Port::new("Normal"),
            ])
            .with_outputs(&["BSDF"])
            .with_properties(PropertyBag::new().with("distribution", text("MULTI_GGX"))),
        NodeMetadata::new(node::TEX_IMAGE, "Image texture")
            .with_inputs(vec![Port::new("Vector")])
            .with_outputs(&["Color", "Alpha"])
            .with_properties(
                PropertyBag::new()
                    .with_unset(node::IMAGE_ATTRIBUTE)
                    .with("interpolation", text("Linear"))
                    .with("projection", text("FLAT"))
                    .with("extension", text("REPEAT")),
            ),
        NodeMetadata::new(node::NORMAL_MAP, "Normal map")
            .with_inputs(vec![
                Port::with_default("Strength", Value::Number(1.0)),
                Port::with_default("Color", rgba(0.5, 0.5, 1.0, 1.0)),
            ])
            .with_outputs(&["Normal"])
            .with_properties(
                PropertyBag::new()
                    .with("space", text("TANGENT"))
                    .with("uv_map", text("")),
            ),
        NodeMetadata::new(node::SEPARATE_COLOR, "Separate color channels")
            .with_inputs(vec![Port::with_default("Color", rgba(0.8, 0.8, 0.8, 1.0))])
            .with_outputs(&["Red", "Green", "Blue"])
            .with_properties(PropertyBag::new().with("mode", text("RGB"))),
        NodeMetadata::new(node::MAPPING, "Vector mapping")
            .with_inputs(vec![
                Port::new("Vector"),
                Port::with_default("Location", Value::Vector(vec![0.0, 0.0, 0.0])),
                Port::with_default("Rotation", Value::Vector(vec![0.0, 0.0, 0.0])),
                Port::with_default("Scale", Value::Vector(vec![1.0, 1.0, 1.0])),
            ])
            .with_outputs(&["Vector"])
            .with_properties(PropertyBag::new().with("vector_type", text("POINT"))),
        NodeMetadata::new(node::TEX_COORD, "Texture coordinates")
            .with_outputs(&[
                "Generated",
                "Normal",
                "UV",
                "Object",
                "Camera",
                "Window",
                "Reflection",
            ])
            .with_properties(PropertyBag::new().with("from_instancer", Value::Bool(false))),
        NodeMetadata::new(node::MIX, "Mix")
            .with_inputs(vec![
                Port::with_default("Factor", Value::Number(0.5)),
                Port::with_default("A", rgba(0.5, 0.5, 0.5, 1.0)),
                Port::with_default("B", rgba(0.5, 0.5, 0.5, 1.0)),
            ])
            .with_outputs(&["Result"])
            .with_properties(
                PropertyBag::new()
                    .with("data_type", text("RGBA"))
                    .with("blend_type", text("MIX")),
            ),
    ]
}
