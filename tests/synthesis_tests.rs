//! End-to-end synthesis tests against the in-memory scene.
//!
//! Each test drives the command layer the way an editor would and then
//! inspects the resulting material graph.

mod common;

use rstest::rstest;
use serde_json::json;

use common::{bundled_creator, creator_with, image_file};
use material_creator::constants::node;
use material_creator::{
    find_shader_node, GraphHost, MaterialError, MaterialLibrary, Template, TextureError,
};

fn metal_template() -> Template {
    Template::from_value(json!({
        "material_config": { "material_types": {
            "metal": {
                "suffix": "_M",
                "required_texture_slots": [
                    {
                        "slot_name": "BaseColor",
                        "description": "Albedo",
                        "properties": {},
                        "connections": [[["ShaderNodeTexImage.Color", "{SHADER}.Base Color"]]]
                    }
                ],
                "optional_texture_slots": []
            }
        }},
        "shader_config": { "node_attributes": {} }
    }))
    .expect("template parses")
}

#[test]
fn test_create_metal_material_end_to_end() {
    let mut creator = creator_with(metal_template());
    let report = creator.create_material("Barrel", "metal").unwrap();
    assert!(report.is_complete());
    assert_eq!(report.created, 1);
    assert_eq!(creator.active_material(), Some("Barrel_M"));

    let host = creator.library_mut().host_mut("Barrel_M").unwrap();
    assert_eq!(host.node_count(), 3);
    let shader = find_shader_node(&host, node::OUTPUT_MATERIAL, node::SURFACE_SOCKET).unwrap();
    let link = host.input_link(shader, "Base Color").unwrap();
    assert_eq!(host.node_type(link.from_node), Some(node::TEX_IMAGE));
    assert_eq!(link.from_socket, "Color");
}

#[rstest]
#[case::metal("metal", 3)]
#[case::glass("glass", 2)]
#[case::default_type("default", 0)]
fn test_second_pass_creates_nothing(#[case] type_name: &str, #[case] expected_nodes: usize) {
    let mut creator = bundled_creator();
    let first = creator.create_material("Crate", type_name).unwrap();
    assert_eq!(first.created, expected_nodes);

    let name = creator.active_material().unwrap().to_string();
    let links_before = creator.library().material(&name).unwrap().graph.connections.len();
    let second = creator.reconcile().unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.removed, 0);

    let graph = &creator.library().material(&name).unwrap().graph;
    assert_eq!(graph.nodes.len(), 2 + expected_nodes);
    assert_eq!(graph.connections.len(), links_before);
}

#[test]
fn test_type_change_reconciles_graph() {
    let mut creator = bundled_creator();
    creator.create_material("Window", "metal").unwrap();
    creator.create_texture_slot("Normal").unwrap();
    assert_eq!(
        creator.library().material("Window_M").unwrap().graph.nodes.len(),
        7
    );

    let report = creator.change_type("glass").unwrap();
    assert_eq!(creator.active_material(), Some("Window_G"));
    assert_eq!(report.touched, ["Base Color", "Alpha"]);

    // Base Color is kept; Metallic, Roughness and the normal chain go.
    assert_eq!(report.removed, 4);
    let host = creator.library_mut().host_mut("Window_G").unwrap();
    let shader = find_shader_node(&host, node::OUTPUT_MATERIAL, node::SURFACE_SOCKET).unwrap();
    assert!(host.input_link(shader, "Metallic").is_none());
    assert!(host.input_link(shader, "Normal").is_none());
    assert!(host.input_link(shader, "Alpha").is_some());
    assert_eq!(host.node_count(), 4);
}

#[test]
fn test_texture_assignment_reuses_image() {
    let mut creator = bundled_creator();
    creator.create_material("Pipe", "metal").unwrap();
    let path = image_file("pipe_metallic.png");

    let first = creator.assign_texture("Metallic", &path).unwrap();
    let second = creator.assign_texture("Roughness", &path).unwrap();
    assert_eq!(first.image, second.image);
    assert_eq!(first.created, 0);
    assert_eq!(creator.library().images().len(), 1);
    assert_eq!(creator.library().images().get_statistics().reuses, 1);
}

#[test]
fn test_ambiguous_texture_binding_is_reported() {
    let mut creator = bundled_creator();
    creator.create_material("Mixed", "metal").unwrap();

    {
        let mut host = creator.library_mut().host_mut("Mixed_M").unwrap();
        let shader = find_shader_node(&host, node::OUTPUT_MATERIAL, node::SURFACE_SOCKET).unwrap();
        let existing = host.input_link(shader, "Base Color").unwrap().from_node;
        let mix = host.create_node(node::MIX).unwrap();
        let second = host.create_node(node::TEX_IMAGE).unwrap();
        host.connect(existing, "Color", mix, "A").unwrap();
        host.connect(second, "Color", mix, "B").unwrap();
        host.connect(mix, "Result", shader, "Base Color").unwrap();
    }

    let err = creator
        .assign_texture("BaseColor", &image_file("mixed.png"))
        .unwrap_err();
    assert!(matches!(
        err,
        MaterialError::Texture(TextureError::AmbiguousTextureBinding { count: 2, .. })
    ));
    assert!(creator.library().images().is_empty());
}

#[test]
fn test_delete_unused_after_assignment() {
    let mut creator = bundled_creator();
    creator.create_material("Used", "default").unwrap();
    let mut cube = material_creator::nodes::SceneObject::new("Cube");
    cube.selected = true;
    creator.library_mut().add_object(cube);
    assert_eq!(creator.assign_to_selection().unwrap(), 1);

    creator.create_material("Spare", "metal").unwrap();
    let deleted = creator.delete_unused_materials().unwrap();
    assert_eq!(deleted, ["Spare_M"]);
    assert_eq!(creator.active_material(), None);
    assert_eq!(creator.library().material_names(), ["Used"]);
}
