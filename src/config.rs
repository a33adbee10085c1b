//! User settings

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{self, node, settings};
use crate::error::ConfigError;

/// Settings of a material creator session.
///
/// Every field has a default, so a settings file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Template document to load
    pub template_path: PathBuf,
    /// Node type holding texture images
    pub image_node_type: String,
    /// Attribute of the image node that receives the image resource
    pub image_attribute: String,
    /// Type token of the material output node
    pub output_node_type: String,
    /// Output node input the shader is linked into
    pub surface_socket: String,
    /// Shader created together with a new material
    pub default_shader_type: String,
    /// Whether full passes also build optional slots
    pub include_optional_slots: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(constants::DEFAULT_TEMPLATE_PATH),
            image_node_type: node::TEX_IMAGE.to_string(),
            image_attribute: node::IMAGE_ATTRIBUTE.to_string(),
            output_node_type: node::OUTPUT_MATERIAL.to_string(),
            surface_socket: node::SURFACE_SOCKET.to_string(),
            default_shader_type: node::BSDF_PRINCIPLED.to_string(),
            include_optional_slots: false,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Location of the per-user settings file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(settings::CONFIG_DIR_NAME).join(settings::FILE_NAME))
    }

    /// Per-user settings, or the defaults when no settings file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_settings(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("material_creator_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let path = write_settings(
            "partial.json",
            r#"{ "include_optional_slots": true, "template_path": "/tmp/custom.json" }"#,
        );
        let settings = Settings::load(&path).unwrap();
        assert!(settings.include_optional_slots);
        assert_eq!(settings.template_path, PathBuf::from("/tmp/custom.json"));
        assert_eq!(settings.image_node_type, node::TEX_IMAGE);
        assert_eq!(settings.surface_socket, node::SURFACE_SOCKET);
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let path = write_settings("broken.json", "{ include_optional_slots: ");
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Settings::load(Path::new("/no/such/settings.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
