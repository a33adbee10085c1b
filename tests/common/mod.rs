//! Shared helpers for the material creator integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use material_creator::nodes::Scene;
use material_creator::{MaterialCreator, Settings, Template};

/// Path of the template bundled with the crate
pub fn bundled_template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("templates")
        .join("default.json")
}

/// Initialize logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A session over an empty in-memory scene
pub fn creator_with(template: Template) -> MaterialCreator<Scene> {
    init_logging();
    let settings = Settings::default();
    MaterialCreator::new(Scene::new(&settings), template, settings)
}

pub fn bundled_creator() -> MaterialCreator<Scene> {
    let template = Template::from_path(&bundled_template_path()).expect("bundled template loads");
    creator_with(template)
}

/// Write a stand-in image file and return its path
pub fn image_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("material_creator_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create image directory");
    let path = dir.join(name);
    std::fs::write(&path, b"image").expect("write image");
    path
}
