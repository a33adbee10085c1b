//! Property applicator: dotted attribute paths onto host nodes

use log::{debug, warn};

use crate::host::{GraphHost, Value};
use crate::template::{PathSegment, PropertyBlock, PropertyPath};

/// A property entry that could not be applied
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Outcome of applying one or more property blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn absorb(&mut self, other: ApplyReport) {
        self.applied += other.applied;
        self.skipped.extend(other.skipped);
    }
}

/// Apply every entry of `block` to `node`.
///
/// A failing entry is logged and skipped; the remaining entries still apply.
pub fn apply<H: GraphHost>(host: &mut H, node: H::Node, block: &PropertyBlock) -> ApplyReport {
    apply_entries(host, node, block.entries())
}

pub fn apply_entries<H: GraphHost>(
    host: &mut H,
    node: H::Node,
    entries: &[(PropertyPath, Value)],
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for (path, value) in entries {
        match apply_entry(host, node, path, value) {
            Ok(()) => {
                debug!("Set {} = {} on node {:?}", path, value, node);
                report.applied += 1;
            }
            Err(reason) => {
                warn!("Skipping property '{}' on node {:?}: {}", path, node, reason);
                report.skipped.push(SkippedEntry {
                    path: path.to_string(),
                    reason,
                });
            }
        }
    }
    report
}

fn apply_entry<H: GraphHost>(
    host: &mut H,
    node: H::Node,
    path: &PropertyPath,
    value: &Value,
) -> Result<(), String> {
    let mut object = host.node_object(node);
    for segment in path.parents() {
        object = step(host, &object, segment)
            .ok_or_else(|| format!("'{segment}' does not resolve"))?;
    }
    host.set_attr(&object, &path.leaf().name, value)
        .map_err(|err| err.to_string())
}

fn step<H: GraphHost>(host: &H, object: &H::Object, segment: &PathSegment) -> Option<H::Object> {
    let object = host.get_attr(object, &segment.name)?;
    match &segment.index {
        Some(index) => host.get_item(&object, index),
        None => Some(object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::node;
    use crate::nodes::test_support::TestGraph;
    use crate::nodes::PortType;

    fn block(entries: &[(&str, Value)]) -> PropertyBlock {
        PropertyBlock::new(
            entries
                .iter()
                .map(|(path, value)| (path.parse().unwrap(), value.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_bad_entry_does_not_abort_the_rest() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let image = host.create_node(node::TEX_IMAGE).unwrap();

        let report = apply(
            &mut host,
            image,
            &block(&[
                ("missing.path", Value::Bool(true)),
                ("interpolation", Value::Text("Closest".into())),
                ("extension", Value::Number(1.0)),
                ("label", Value::Text("Albedo".into())),
            ]),
        );

        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].path, "missing.path");
        assert!(!report.is_complete());

        let node = fixture.graph.node(image).unwrap();
        assert_eq!(node.properties.value("interpolation"), Some(&Value::Text("Closest".into())));
        assert_eq!(node.properties.value("extension"), Some(&Value::Text("REPEAT".into())));
        assert_eq!(node.properties.value("label"), Some(&Value::Text("Albedo".into())));
    }

    #[test]
    fn test_indexed_socket_paths() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let shader = host.create_node(node::BSDF_PRINCIPLED).unwrap();

        let report = apply(
            &mut host,
            shader,
            &block(&[
                ("inputs[1].default_value", Value::Number(1.0)),
                ("inputs[Roughness].default_value", Value::Number(0.25)),
                ("inputs[99].default_value", Value::Number(0.0)),
            ]),
        );
        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 1);

        let ports = fixture.graph.node(shader).unwrap().ports(PortType::Input);
        assert_eq!(ports[1].default_value(), Some(&Value::Number(1.0)));
        assert_eq!(ports[2].default_value(), Some(&Value::Number(0.25)));
    }

    #[test]
    fn test_resource_attributes_are_walked() {
        let mut fixture = TestGraph::new();
        let path = fixture.image_file("albedo.png");
        let mut host = fixture.host();
        let image_node = host.create_node(node::TEX_IMAGE).unwrap();
        let image = host.load_image(&path).unwrap();

        let report = apply(
            &mut host,
            image_node,
            &block(&[
                ("image", Value::Resource(image)),
                ("image.colorspace_settings.name", Value::Text("Non-Color".into())),
            ]),
        );
        assert!(report.is_complete());
        assert_eq!(host.load_image(&path).unwrap(), image);

        let stored = fixture.images.get(image).unwrap();
        let colorspace = stored
            .properties
            .group(&["colorspace_settings".to_string()])
            .unwrap();
        assert_eq!(colorspace.value("name"), Some(&Value::Text("Non-Color".into())));
    }
}
