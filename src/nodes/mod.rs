//! In-memory shader graph host - core data structures and the scene

// Core node system modules
pub mod cache;
pub mod factory;
pub mod graph;
pub mod node;
pub mod port;
pub mod property;

// Host implementation
pub mod scene;
pub mod view;

// Re-export core types
pub use graph::{Connection, NodeGraph};
pub use node::{Node, NodeId};
pub use port::{Port, PortId, PortType};
pub use property::{Property, PropertyBag};

// Re-export factory types
pub use factory::{NodeMetadata, NodeRegistry, PortDefinition};

// Re-export host types
pub use cache::{CacheStatistics, Image, ImageCache};
pub use scene::{Material, Scene, SceneObject};
pub use view::{HostObject, MaterialGraph};
