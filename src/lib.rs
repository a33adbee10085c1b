//! Material creator library
//!
//! Template-driven synthesis of material shader graphs: a template describes
//! material types, their texture slots and how each slot is wired into the
//! shader. The synthesis engine creates, reuses and removes nodes in a live
//! graph so it matches the material's current type and textures.

// Public modules
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod material;
pub mod nodes;
pub mod synthesis;
pub mod template;

// Re-export commonly used types
pub use config::Settings;
pub use error::{
    ConfigError, CyclicGraphError, HostError, MaterialError, SchemaError, SynthesisError,
    TextureError,
};
pub use host::{find_shader_node, GraphHost, Link, MaterialLibrary, ResourceHandle, Value};
pub use material::{MaterialCreator, MaterialResult};
pub use synthesis::{SynthesisReport, Synthesizer, TextureAssignment};
pub use template::{MaterialTypeSpec, Template, TextureSlotSpec};
