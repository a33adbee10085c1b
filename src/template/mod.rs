//! Template schema - immutable material type rules parsed from a document

pub mod path;
pub mod schema;

pub use path::{PathIndex, PathSegment, PropertyPath};
pub use schema::{
    Chain, Hop, InputRef, MaterialTypeSpec, OutputRef, PropertyBlock, Role, Template,
    TextureSlotSpec,
};
