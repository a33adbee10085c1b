//! Error types for template loading, graph synthesis and the command layer

use std::path::PathBuf;
use thiserror::Error;

/// Direction of a socket on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketDirection {
    Input,
    Output,
}

impl std::fmt::Display for SocketDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketDirection::Input => write!(f, "input"),
            SocketDirection::Output => write!(f, "output"),
        }
    }
}

/// A template document that cannot be turned into a schema.
///
/// Loading is all-or-nothing: any of these fails the whole document.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed template document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{material_type}/{slot}: connection {chain} is empty")]
    EmptyChain {
        material_type: String,
        slot: String,
        chain: usize,
    },
    #[error("{material_type}/{slot}: connection {chain} has {count} {{SHADER}} hops, expected exactly one")]
    ShaderHopCount {
        material_type: String,
        slot: String,
        chain: usize,
        count: usize,
    },
    #[error("{material_type}/{slot}: connection {chain} must end at the {{SHADER}} hop")]
    ShaderHopNotLast {
        material_type: String,
        slot: String,
        chain: usize,
    },
    #[error("{material_type}/{slot}: malformed reference '{reference}', expected '<Type>.<Socket>'")]
    MalformedReference {
        material_type: String,
        slot: String,
        reference: String,
    },
    #[error("{material_type}/{slot}: reference to undefined role '{role}'")]
    UndefinedRole {
        material_type: String,
        slot: String,
        role: String,
    },
    #[error("{material_type}/{slot}: invalid property path '{path}': {reason}")]
    InvalidPropertyPath {
        material_type: String,
        slot: String,
        path: String,
        reason: String,
    },
    #[error("{material_type}/{slot}: unsupported value for property '{path}'")]
    UnsupportedValue {
        material_type: String,
        slot: String,
        path: String,
    },
    #[error("{material_type}: slot '{slot}' is declared more than once")]
    DuplicateSlot { material_type: String, slot: String },
}

/// Failure reported by a graph host capability
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),
    #[error("Node {0} does not exist")]
    NoSuchNode(String),
    #[error("Node '{node_type}' has no {direction} socket '{socket}'")]
    NoSuchSocket {
        node_type: String,
        socket: String,
        direction: SocketDirection,
    },
    #[error("Cannot link: {0}")]
    InvalidLink(String),
    #[error("No attribute '{0}'")]
    NoSuchAttribute(String),
    #[error("Attribute '{attribute}' expects {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Cannot load image {path}: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Material '{0}' does not exist")]
    UnknownMaterial(String),
    #[error("Material name '{0}' is already taken")]
    NameTaken(String),
}

/// An upstream walk came back to a node that is still on the current path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Link cycle detected at node {node} ('{node_type}')")]
pub struct CyclicGraphError {
    pub node: String,
    pub node_type: String,
}

/// Failure while compiling a chain or reconciling a graph
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Could not find the shader node")]
    ShaderNodeNotFound,
    #[error("Node '{node_type}' has no {direction} socket '{socket}'")]
    MissingSocket {
        node_type: String,
        socket: String,
        direction: SocketDirection,
    },
    #[error(transparent)]
    CyclicGraph(#[from] CyclicGraphError),
    #[error("Node {node} ('{node_type}') is shared between orphaned and live subgraphs")]
    SharedSubgraph { node: String, node_type: String },
    #[error("Material type has no slot named '{0}'")]
    UnknownSlot(String),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Failure while binding an image to a texture slot
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Material type has no slot named '{0}'")]
    UnknownSlot(String),
    #[error("Multiple textures ({count}) connected to slot '{slot}' at '{socket}', only one is allowed")]
    AmbiguousTextureBinding {
        slot: String,
        socket: String,
        count: usize,
    },
    #[error("No texture node found for slot '{0}'")]
    NoImageNode(String),
    #[error("Image could not be assigned to slot '{slot}': {reason}")]
    ImageNotAssigned { slot: String, reason: String },
    #[error("Failed to load image {path}: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: HostError,
    },
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Failure of a material-level command
#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Cannot find material named '{0}'")]
    UnknownMaterial(String),
    #[error("Unknown material type '{0}'")]
    UnknownMaterialType(String),
    #[error("No active material")]
    NoActiveMaterial,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Failure while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
pub type HostResult<T> = Result<T, HostError>;
pub type SynthesisResult<T> = Result<T, SynthesisError>;
