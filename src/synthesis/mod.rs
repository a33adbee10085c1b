//! Graph synthesis engine
//!
//! Walks a template's connection chains against a live shader graph, creating
//! or reusing nodes, and removes the subgraphs a pass leaves behind.

pub mod compiler;
pub mod locator;
pub mod orphans;
pub mod properties;
pub mod synthesizer;
pub mod texture;

pub use compiler::{compile, ChainFailure, SlotCompilation};
pub use locator::{find_all, find_first};
pub use orphans::collect;
pub use properties::{apply, ApplyReport, SkippedEntry};
pub use synthesizer::{SlotFailure, SynthesisReport, Synthesizer};
pub use texture::{assign_texture, texture_nodes, TextureAssignment};
