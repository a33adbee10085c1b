//! Texture-map assignment
//!
//! Binds an image file to the image-bearing leaf nodes of a slot, building the
//! slot's wiring first when the graph has none.

use std::path::Path;

use log::{error, info};

use super::locator;
use super::properties::{self, ApplyReport};
use super::synthesizer::{SlotFailure, Synthesizer};
use crate::error::{SynthesisError, TextureError};
use crate::host::{GraphHost, ResourceHandle, Value};
use crate::template::{PropertyPath, TextureSlotSpec};

/// Outcome of a texture assignment
#[derive(Debug)]
pub struct TextureAssignment<N> {
    pub image: ResourceHandle,
    /// Leaf nodes that received the image
    pub nodes: Vec<N>,
    /// Nodes created to wire the slot
    pub created: usize,
    /// Chains that could not be wired while building the slot
    pub failures: Vec<SlotFailure>,
    pub properties: ApplyReport,
}

/// The image-bearing leaves bound to a slot, without modifying the graph.
///
/// More than one leaf behind a single shader socket is an ambiguous binding.
pub fn texture_nodes<H: GraphHost>(
    host: &H,
    synthesizer: &Synthesizer<'_>,
    slot_name: &str,
) -> Result<Vec<H::Node>, TextureError> {
    let slot = lookup_slot(synthesizer, slot_name)?;
    locate(host, synthesizer, slot)
}

/// Load `image_path` and assign it to every image leaf of `slot_name`, then
/// apply the slot's overrides for the leaf type.
pub fn assign_texture<H: GraphHost>(
    host: &mut H,
    synthesizer: &Synthesizer<'_>,
    slot_name: &str,
    image_path: &Path,
) -> Result<TextureAssignment<H::Node>, TextureError> {
    let slot = lookup_slot(synthesizer, slot_name)?;

    let mut created = 0;
    let mut failures = Vec::new();
    let mut leaves = locate(&*host, synthesizer, slot)?;
    if leaves.is_empty() {
        let report = synthesizer.synthesize_slot(host, slot_name)?;
        created = report.created;
        failures = report.failures;
        leaves = locate(&*host, synthesizer, slot)?;
    }
    if leaves.is_empty() {
        // A chain that failed to build explains the missing leaf better.
        return Err(match failures.into_iter().next() {
            Some(failure) => TextureError::Synthesis(failure.error),
            None => TextureError::NoImageNode(slot_name.to_string()),
        });
    }

    let image = host
        .load_image(image_path)
        .map_err(|source| TextureError::ResourceLoad {
            path: image_path.to_path_buf(),
            source,
        })?;

    let settings = synthesizer.settings();
    let image_entry = PropertyPath::attribute(&settings.image_attribute)
        .map(|path| vec![(path, Value::Resource(image))])
        .map_err(|reason| TextureError::ImageNotAssigned {
            slot: slot_name.to_string(),
            reason,
        })?;

    let mut applied = ApplyReport::default();
    for leaf in &leaves {
        let report = properties::apply_entries(host, *leaf, &image_entry);
        if let Some(skipped) = report.skipped.into_iter().next() {
            return Err(TextureError::ImageNotAssigned {
                slot: slot_name.to_string(),
                reason: skipped.reason,
            });
        }
        applied.applied += report.applied;

        let leaf_type = host.node_type(*leaf).unwrap_or_default().to_string();
        if let Some(block) = slot.properties_for(&leaf_type) {
            applied.absorb(properties::apply(host, *leaf, block));
        }
    }

    info!(
        "Assigned {} to slot '{}' ({} node(s))",
        image_path.display(),
        slot_name,
        leaves.len()
    );
    Ok(TextureAssignment {
        image,
        nodes: leaves,
        created,
        failures,
        properties: applied,
    })
}

fn lookup_slot<'a>(
    synthesizer: &Synthesizer<'a>,
    slot_name: &str,
) -> Result<&'a TextureSlotSpec, TextureError> {
    synthesizer
        .material_type()
        .slot(slot_name)
        .ok_or_else(|| TextureError::UnknownSlot(slot_name.to_string()))
}

fn locate<H: GraphHost>(
    host: &H,
    synthesizer: &Synthesizer<'_>,
    slot: &TextureSlotSpec,
) -> Result<Vec<H::Node>, TextureError> {
    let shader = synthesizer
        .shader_node(host)
        .ok_or(SynthesisError::ShaderNodeNotFound)?;
    let image_type = &synthesizer.settings().image_node_type;

    let mut leaves = Vec::new();
    for socket in slot.shader_sockets() {
        let Some(link) = host.input_link(shader, socket) else {
            continue;
        };
        let found = locator::find_all(host, link.from_node, image_type)
            .map_err(SynthesisError::from)?;
        if found.len() > 1 {
            error!(
                "Multiple textures ({}) connected to slot '{}' at '{}'",
                found.len(),
                slot.slot_name,
                socket
            );
            return Err(TextureError::AmbiguousTextureBinding {
                slot: slot.slot_name.clone(),
                socket: socket.to_string(),
                count: found.len(),
            });
        }
        for node in found {
            if !leaves.contains(&node) {
                leaves.push(node);
            }
        }
    }
    Ok(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::constants::node;
    use crate::nodes::test_support::TestGraph;
    use crate::template::Template;
    use serde_json::json;

    fn template() -> Template {
        Template::from_value(json!({
            "material_config": { "material_types": {
                "metal": {
                    "suffix": "_M",
                    "required_texture_slots": [
                        {
                            "slot_name": "BaseColor", "description": "", "properties": {},
                            "connections": [[["ShaderNodeTexImage.Color", "{SHADER}.Base Color"]]]
                        }
                    ],
                    "optional_texture_slots": [
                        {
                            "slot_name": "Normal", "description": "",
                            "properties": {
                                "ShaderNodeTexImage": {
                                    "image.colorspace_settings.name": "Non-Color"
                                }
                            },
                            "connections": [[
                                ["ShaderNodeTexImage.Color", "ShaderNodeNormalMap.Color"],
                                ["ShaderNodeNormalMap.Normal", "{SHADER}.Normal"]
                            ]]
                        },
                        {
                            "slot_name": "Sheen", "description": "", "properties": {},
                            "connections": [[["ShaderNodeTexImage.Color", "{SHADER}.Sheen Tint"]]]
                        },
                        {
                            "slot_name": "Detail", "description": "", "properties": {},
                            "connections": [
                                [["ShaderNodeTexImage.Color", "{SHADER}.Emission Color"]],
                                [["ShaderNodeTexImage.Color", "{SHADER}.Sheen Tint"]]
                            ]
                        }
                    ]
                }
            }},
            "shader_config": { "node_attributes": {} }
        }))
        .unwrap()
    }

    fn material_graph(fixture: &mut TestGraph) -> usize {
        let mut host = fixture.host();
        let output = host.create_node(node::OUTPUT_MATERIAL).unwrap();
        let shader = host.create_node(node::BSDF_PRINCIPLED).unwrap();
        host.connect(shader, "BSDF", output, "Surface").unwrap();
        shader
    }

    #[test]
    fn test_assign_builds_missing_wiring() {
        let template = template();
        let settings = Settings::default();
        let synthesizer = Synthesizer::new(template.get("metal").unwrap(), &settings);
        let mut fixture = TestGraph::new();
        material_graph(&mut fixture);
        let path = fixture.image_file("normal.png");
        let mut host = fixture.host();

        let assignment = assign_texture(&mut host, &synthesizer, "Normal", &path).unwrap();
        assert_eq!(assignment.created, 2);
        assert_eq!(assignment.nodes.len(), 1);
        assert!(assignment.properties.is_complete());
        assert_eq!(assignment.properties.applied, 2);

        let leaf = assignment.nodes[0];
        assert_eq!(texture_nodes(&host, &synthesizer, "Normal").unwrap(), vec![leaf]);

        let again = assign_texture(&mut host, &synthesizer, "Normal", &path).unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.image, assignment.image);
        assert_eq!(host.images.len(), 1);

        let image = host.images.get(assignment.image).unwrap();
        let colorspace = image
            .properties
            .group(&["colorspace_settings".to_string()])
            .unwrap();
        assert_eq!(colorspace.value("name"), Some(&Value::Text("Non-Color".into())));
        assert_eq!(
            fixture.graph.node(leaf).unwrap().properties.value(node::IMAGE_ATTRIBUTE),
            Some(&Value::Resource(assignment.image))
        );
    }

    #[test]
    fn test_ambiguous_binding_modifies_nothing() {
        let template = template();
        let settings = Settings::default();
        let synthesizer = Synthesizer::new(template.get("metal").unwrap(), &settings);
        let mut fixture = TestGraph::new();
        let shader = material_graph(&mut fixture);
        let path = fixture.image_file("albedo.png");
        let mut host = fixture.host();

        let mix = host.create_node(node::MIX).unwrap();
        let a = host.create_node(node::TEX_IMAGE).unwrap();
        let b = host.create_node(node::TEX_IMAGE).unwrap();
        host.connect(a, "Color", mix, "A").unwrap();
        host.connect(b, "Color", mix, "B").unwrap();
        host.connect(mix, "Result", shader, "Base Color").unwrap();

        let err = assign_texture(&mut host, &synthesizer, "BaseColor", &path).unwrap_err();
        assert!(matches!(
            err,
            TextureError::AmbiguousTextureBinding { count: 2, .. }
        ));
        assert!(host.images.is_empty());
        for leaf in [a, b] {
            let properties = &fixture.graph.node(leaf).unwrap().properties;
            assert!(properties.value(node::IMAGE_ATTRIBUTE).is_none());
        }
    }

    #[test]
    fn test_unreadable_image_is_a_load_error() {
        let template = template();
        let settings = Settings::default();
        let synthesizer = Synthesizer::new(template.get("metal").unwrap(), &settings);
        let mut fixture = TestGraph::new();
        material_graph(&mut fixture);
        let mut host = fixture.host();

        let err = assign_texture(
            &mut host,
            &synthesizer,
            "BaseColor",
            Path::new("/missing/albedo.png"),
        )
        .unwrap_err();
        assert!(matches!(err, TextureError::ResourceLoad { .. }));
        assert!(matches!(
            assign_texture(&mut host, &synthesizer, "Emission", Path::new("x.png")),
            Err(TextureError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_lookup_without_shader() {
        let template = template();
        let settings = Settings::default();
        let synthesizer = Synthesizer::new(template.get("metal").unwrap(), &settings);
        let mut fixture = TestGraph::new();
        let host = fixture.host();

        assert!(matches!(
            texture_nodes(&host, &synthesizer, "BaseColor"),
            Err(TextureError::Synthesis(SynthesisError::ShaderNodeNotFound))
        ));
    }

    #[test]
    fn test_slot_build_failures_are_surfaced() {
        let template = template();
        let settings = Settings::default();
        let synthesizer = Synthesizer::new(template.get("metal").unwrap(), &settings);
        let mut fixture = TestGraph::new();
        material_graph(&mut fixture);
        let path = fixture.image_file("sheen.png");
        let mut host = fixture.host();

        let err = assign_texture(&mut host, &synthesizer, "Sheen", &path).unwrap_err();
        assert!(matches!(
            err,
            TextureError::Synthesis(SynthesisError::MissingSocket { ref socket, .. })
                if socket == "Sheen Tint"
        ));
        assert!(host.images.is_empty());

        let assignment = assign_texture(&mut host, &synthesizer, "Detail", &path).unwrap();
        assert_eq!(assignment.nodes.len(), 1);
        assert_eq!(assignment.failures.len(), 1);
        assert_eq!(assignment.failures[0].chain, Some(1));
    }
}
