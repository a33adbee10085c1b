//! Material commands
//!
//! [`MaterialCreator`] is the editing session: the loaded template, the user
//! settings and the material being worked on. Every command re-discovers the
//! material's graph through the [`MaterialLibrary`].

use std::path::Path;

use log::{info, warn};

use crate::config::Settings;
use crate::error::MaterialError;
use crate::host::MaterialLibrary;
use crate::synthesis::{self, Synthesizer, SynthesisReport, TextureAssignment};
use crate::template::{MaterialTypeSpec, Template};

pub type MaterialResult<T> = Result<T, MaterialError>;

/// An editing session over a material library
pub struct MaterialCreator<L: MaterialLibrary> {
    library: L,
    template: Template,
    settings: Settings,
    active: Option<String>,
}

impl<L: MaterialLibrary> MaterialCreator<L> {
    pub fn new(library: L, template: Template, settings: Settings) -> Self {
        Self {
            library,
            template,
            settings,
            active: None,
        }
    }

    /// Start a session with the template named in `settings`
    pub fn from_settings(library: L, settings: Settings) -> MaterialResult<Self> {
        let template = Template::from_path(&settings.template_path)?;
        Ok(Self::new(library, template, settings))
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Replace the template wholesale, e.g. after the document changed on disk
    pub fn set_template(&mut self, template: Template) {
        self.template = template;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Name of the material the commands act on
    pub fn active_material(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active_material(&mut self, name: &str) -> MaterialResult<()> {
        if !self.library.contains(name) {
            return Err(MaterialError::UnknownMaterial(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    /// Type of the active material, inferred from its name
    pub fn material_type(&self) -> MaterialResult<&MaterialTypeSpec> {
        let active = self.active_name()?;
        Ok(self.template.infer_type(active))
    }

    /// Create a material of `type_name` and build its slots.
    ///
    /// The material is named `name` plus the type's suffix; the library may
    /// adjust the name further to keep it unique. The new material becomes
    /// the active one.
    pub fn create_material(
        &mut self,
        name: &str,
        type_name: &str,
    ) -> MaterialResult<SynthesisReport<L::Node>> {
        let material_type = lookup_type(&self.template, type_name)?;
        let created = self.library.create_material(&material_type.decorate(name))?;
        info!("Created material '{}' of type '{}'", created, material_type.name);
        self.active = Some(created.clone());
        reconcile_as(&mut self.library, &self.settings, &created, material_type)
    }

    /// Give the active material another type.
    ///
    /// The old type's suffix is replaced by the new one in the material name,
    /// then the graph is reconciled: slots of the new type are built and
    /// subgraphs feeding inputs it does not use are removed.
    pub fn change_type(&mut self, type_name: &str) -> MaterialResult<SynthesisReport<L::Node>> {
        let active = self.active_name()?.to_string();
        let new_type = lookup_type(&self.template, type_name)?;
        let old_type = self.template.infer_type(&active);

        let new_name = new_type.decorate(old_type.strip(&active));
        let renamed = if new_name == active {
            active
        } else {
            let renamed = self.library.rename_material(&active, &new_name)?;
            info!("Material '{}' renamed to '{}'", active, renamed);
            renamed
        };
        self.active = Some(renamed.clone());

        // A host that adjusted the name may have lost the suffix match.
        if self.template.infer_type(&renamed).name != new_type.name {
            warn!(
                "Material '{}' no longer carries the suffix of type '{}'",
                renamed, new_type.name
            );
        }
        reconcile_as(&mut self.library, &self.settings, &renamed, new_type)
    }

    /// Rebuild the active material's graph for its current type
    pub fn reconcile(&mut self) -> MaterialResult<SynthesisReport<L::Node>> {
        let active = self.active_name()?.to_string();
        let material_type = self.template.infer_type(&active);
        reconcile_as(&mut self.library, &self.settings, &active, material_type)
    }

    /// Build the wiring of one slot, required or optional, without removing
    /// anything
    pub fn create_texture_slot(
        &mut self,
        slot_name: &str,
    ) -> MaterialResult<SynthesisReport<L::Node>> {
        let active = self.active_name()?.to_string();
        let material_type = self.template.infer_type(&active);
        let synthesizer = Synthesizer::new(material_type, &self.settings);
        let mut host = host_for(&mut self.library, &active)?;
        Ok(synthesizer.synthesize_slot(&mut host, slot_name)?)
    }

    /// Load an image and bind it to a slot of the active material
    pub fn assign_texture(
        &mut self,
        slot_name: &str,
        image_path: &Path,
    ) -> MaterialResult<TextureAssignment<L::Node>> {
        let active = self.active_name()?.to_string();
        let material_type = self.template.infer_type(&active);
        let synthesizer = Synthesizer::new(material_type, &self.settings);
        let mut host = host_for(&mut self.library, &active)?;
        Ok(synthesis::assign_texture(&mut host, &synthesizer, slot_name, image_path)?)
    }

    /// Image nodes currently bound to a slot of the active material
    pub fn texture_nodes(&mut self, slot_name: &str) -> MaterialResult<Vec<L::Node>> {
        let active = self.active_name()?.to_string();
        let material_type = self.template.infer_type(&active);
        let synthesizer = Synthesizer::new(material_type, &self.settings);
        let host = host_for(&mut self.library, &active)?;
        Ok(synthesis::texture_nodes(&host, &synthesizer, slot_name)?)
    }

    /// Rename the active material, returning the name the library settled on
    pub fn rename(&mut self, new_name: &str) -> MaterialResult<String> {
        let active = self.active_name()?.to_string();
        let renamed = self.library.rename_material(&active, new_name)?;
        self.active = Some(renamed.clone());
        Ok(renamed)
    }

    /// Delete the active material
    pub fn delete(&mut self) -> MaterialResult<()> {
        let active = self.active_name()?.to_string();
        self.library.remove_material(&active)?;
        self.active = None;
        Ok(())
    }

    /// Assign the active material to every selected object
    pub fn assign_to_selection(&mut self) -> MaterialResult<usize> {
        let active = self.active_name()?.to_string();
        Ok(self.library.assign_to_selection(&active)?)
    }

    /// Delete every material without users, returning the deleted names
    pub fn delete_unused_materials(&mut self) -> MaterialResult<Vec<String>> {
        let unused: Vec<String> = self
            .library
            .material_names()
            .into_iter()
            .filter(|name| self.library.user_count(name) == 0)
            .collect();

        for name in &unused {
            self.library.remove_material(name)?;
            if self.active.as_deref() == Some(name.as_str()) {
                self.active = None;
            }
        }
        info!("Deleted {} unused material(s)", unused.len());
        Ok(unused)
    }

    fn active_name(&self) -> MaterialResult<&str> {
        let active = self.active.as_deref().ok_or(MaterialError::NoActiveMaterial)?;
        if !self.library.contains(active) {
            return Err(MaterialError::UnknownMaterial(active.to_string()));
        }
        Ok(active)
    }
}

fn lookup_type<'t>(
    template: &'t Template,
    type_name: &str,
) -> MaterialResult<&'t MaterialTypeSpec> {
    template
        .get(type_name)
        .ok_or_else(|| MaterialError::UnknownMaterialType(type_name.to_string()))
}

/// Full pass for `material_type` over the graph of material `name`
fn reconcile_as<L: MaterialLibrary>(
    library: &mut L,
    settings: &Settings,
    name: &str,
    material_type: &MaterialTypeSpec,
) -> MaterialResult<SynthesisReport<L::Node>> {
    let synthesizer = Synthesizer::new(material_type, settings);
    let mut host = host_for(library, name)?;
    Ok(synthesizer.reconcile(&mut host, settings.include_optional_slots)?)
}

fn host_for<'l, L: MaterialLibrary>(library: &'l mut L, name: &str) -> MaterialResult<L::Host<'l>> {
    library
        .host_mut(name)
        .ok_or_else(|| MaterialError::UnknownMaterial(name.to_string()))
}
