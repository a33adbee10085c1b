//! In-memory scene: materials, the objects using them and shared resources

use log::{debug, info};
use serde::Serialize;

use super::cache::ImageCache;
use super::factory::NodeRegistry;
use super::graph::NodeGraph;
use super::node::NodeId;
use super::view::MaterialGraph;
use crate::config::Settings;
use crate::error::{HostError, HostResult, SocketDirection};
use crate::host::MaterialLibrary;

/// A named material and its shader graph
#[derive(Debug, Clone, Serialize)]
pub struct Material {
    pub name: String,
    pub graph: NodeGraph,
}

/// A mesh object with material slots
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneObject {
    pub name: String,
    pub material_slots: Vec<Option<String>>,
    pub active_slot: usize,
    pub selected: bool,
}

impl SceneObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn uses(&self, material: &str) -> usize {
        self.material_slots
            .iter()
            .filter(|slot| slot.as_deref() == Some(material))
            .count()
    }
}

/// Stand-alone [`MaterialLibrary`] used by the binary and the tests
#[derive(Debug)]
pub struct Scene {
    registry: NodeRegistry,
    images: ImageCache,
    materials: Vec<Material>,
    objects: Vec<SceneObject>,
    output_node_type: String,
    shader_node_type: String,
    surface_socket: String,
}

impl Scene {
    /// Empty scene creating the node types named in `settings` for new materials
    pub fn new(settings: &Settings) -> Self {
        Self::with_registry(NodeRegistry::with_builtins(), settings)
    }

    pub fn with_registry(registry: NodeRegistry, settings: &Settings) -> Self {
        Self {
            registry,
            images: ImageCache::new(),
            materials: Vec::new(),
            objects: Vec::new(),
            output_node_type: settings.output_node_type.clone(),
            shader_node_type: settings.default_shader_type.clone(),
            surface_socket: settings.surface_socket.clone(),
        }
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.name == name)
    }

    /// Add an object, returning its index
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Change the selection state of an object by name
    pub fn select(&mut self, name: &str, selected: bool) -> bool {
        match self.objects.iter_mut().find(|object| object.name == name) {
            Some(object) => {
                object.selected = selected;
                true
            }
            None => false,
        }
    }

    fn position(&self, name: &str) -> HostResult<usize> {
        self.materials
            .iter()
            .position(|material| material.name == name)
            .ok_or_else(|| HostError::UnknownMaterial(name.to_string()))
    }

    /// `base`, or `base.001`, `base.002`, ... whichever is free first
    fn unique_name(&self, base: &str, ignore: Option<usize>) -> String {
        let taken = |candidate: &str| {
            self.materials
                .iter()
                .enumerate()
                .any(|(index, material)| Some(index) != ignore && material.name == candidate)
        };
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|counter| format!("{base}.{counter:03}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Output node with the default shader linked into its surface input
    fn default_graph(&self) -> HostResult<NodeGraph> {
        let mut graph = NodeGraph::new();
        let create = |node_type: &str| {
            self.registry
                .create_node(node_type)
                .ok_or_else(|| HostError::UnknownNodeType(node_type.to_string()))
        };

        let output = create(&self.output_node_type)?;
        let surface = output.input_index(&self.surface_socket).ok_or_else(|| {
            HostError::NoSuchSocket {
                node_type: output.node_type.clone(),
                socket: self.surface_socket.clone(),
                direction: SocketDirection::Input,
            }
        })?;
        let shader = create(&self.shader_node_type)?;
        if shader.outputs.is_empty() {
            return Err(HostError::NoSuchSocket {
                node_type: shader.node_type.clone(),
                socket: "<any>".to_string(),
                direction: SocketDirection::Output,
            });
        }

        let output = graph.add_node(output);
        let shader = graph.add_node(shader);
        graph
            .add_connection_by_ids(shader, 0, output, surface)
            .map_err(|reason| HostError::InvalidLink(reason.to_string()))?;
        Ok(graph)
    }
}

impl MaterialLibrary for Scene {
    type Node = NodeId;
    type Host<'a> = MaterialGraph<'a>;

    fn contains(&self, name: &str) -> bool {
        self.material(name).is_some()
    }

    fn material_names(&self) -> Vec<String> {
        self.materials
            .iter()
            .map(|material| material.name.clone())
            .collect()
    }

    fn create_material(&mut self, name: &str) -> HostResult<String> {
        let graph = self.default_graph()?;
        let name = self.unique_name(name, None);
        info!("Created material '{}'", name);
        self.materials.push(Material {
            name: name.clone(),
            graph,
        });
        Ok(name)
    }

    fn rename_material(&mut self, name: &str, new_name: &str) -> HostResult<String> {
        let index = self.position(name)?;
        if new_name.is_empty() {
            return Err(HostError::NameTaken(new_name.to_string()));
        }
        let final_name = self.unique_name(new_name, Some(index));
        if final_name == name {
            return Ok(final_name);
        }

        for slot in self
            .objects
            .iter_mut()
            .flat_map(|object| object.material_slots.iter_mut())
        {
            if slot.as_deref() == Some(name) {
                *slot = Some(final_name.clone());
            }
        }
        self.materials[index].name = final_name.clone();
        debug!("Renamed material '{}' to '{}'", name, final_name);
        Ok(final_name)
    }

    fn remove_material(&mut self, name: &str) -> HostResult<()> {
        let index = self.position(name)?;
        self.materials.remove(index);
        for slot in self
            .objects
            .iter_mut()
            .flat_map(|object| object.material_slots.iter_mut())
        {
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }
        info!("Removed material '{}'", name);
        Ok(())
    }

    fn user_count(&self, name: &str) -> usize {
        self.objects.iter().map(|object| object.uses(name)).sum()
    }

    fn assign_to_selection(&mut self, name: &str) -> HostResult<usize> {
        self.position(name)?;
        let mut changed = 0;
        for object in self.objects.iter_mut().filter(|object| object.selected) {
            if object.material_slots.is_empty() {
                object.material_slots.push(None);
                object.active_slot = 0;
            }
            let active = object.active_slot.min(object.material_slots.len() - 1);
            let slot = &mut object.material_slots[active];
            if slot.as_deref() != Some(name) {
                *slot = Some(name.to_string());
                changed += 1;
            }
        }
        debug!("Assigned '{}' to {} selected object(s)", name, changed);
        Ok(changed)
    }

    fn host_mut(&mut self, name: &str) -> Option<MaterialGraph<'_>> {
        let Self {
            materials,
            registry,
            images,
            ..
        } = self;
        let material = materials.iter_mut().find(|material| material.name == name)?;
        Some(MaterialGraph::new(&mut material.graph, registry, images))
    }
}
