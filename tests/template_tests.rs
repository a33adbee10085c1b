//! Loading the bundled template and inferring types from material names.

mod common;

use std::path::Path;

use rstest::rstest;

use common::{bundled_template_path, init_logging};
use material_creator::{SchemaError, Template};

fn bundled() -> Template {
    init_logging();
    Template::from_path(&bundled_template_path()).expect("bundled template loads")
}

#[test]
fn test_bundled_template_loads() {
    let template = bundled();
    let names: Vec<&str> = template
        .material_types()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, ["default", "metal", "glass"]);

    let metal = template.get("metal").unwrap();
    assert_eq!(metal.required_slots.len(), 3);
    assert_eq!(metal.optional_slots.len(), 1);
    let normal = metal.slot("Normal").unwrap();
    assert_eq!(normal.connections()[0].hops().len(), 2);
    assert_eq!(normal.shader_sockets(), ["Normal"]);

    assert_eq!(
        template.node_attributes().get("ShaderNodeTexImage").map(String::as_str),
        Some("image")
    );
}

#[rstest]
#[case::metal_suffix("Barrel_M", "metal")]
#[case::glass_suffix("Window_G", "glass")]
#[case::no_suffix("Crate", "default")]
#[case::suffix_inside_name("Pipe_M_old", "default")]
#[case::numbered_duplicate("Barrel_M.001", "default")]
fn test_type_inference(#[case] material_name: &str, #[case] expected: &str) {
    let template = bundled();
    assert_eq!(template.infer_type(material_name).name, expected);
}

#[rstest]
#[case("metal", "Barrel", "Barrel_M")]
#[case("metal", "Barrel_M", "Barrel_M")]
#[case("glass", "Barrel_M", "Barrel_M_G")]
#[case("default", "Barrel", "Barrel")]
fn test_name_decoration(#[case] type_name: &str, #[case] base: &str, #[case] expected: &str) {
    let template = bundled();
    assert_eq!(template.get(type_name).unwrap().decorate(base), expected);
}

#[test]
fn test_missing_template_file() {
    let err = Template::from_path(Path::new("/nonexistent/material_template.json")).unwrap_err();
    assert!(matches!(err, SchemaError::Io { .. }));
}

#[test]
fn test_unknown_type_lookup() {
    let template = bundled();
    assert!(template.get("wood").is_none());
    // The implicit default type resolves even when the document omits it.
    let minimal = Template::from_json_str(
        r#"{
            "material_config": { "material_types": {} },
            "shader_config": { "node_attributes": {} }
        }"#,
    )
    .unwrap();
    assert_eq!(minimal.get("default").unwrap().name, "default");
    assert_eq!(minimal.infer_type("Anything_M").name, "default");
}
