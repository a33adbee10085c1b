//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Name of the fallback material type used when no suffix matches
pub const DEFAULT_TYPE: &str = "default";

/// Template path used when no settings file overrides it
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/default.json";

/// Template document constants
pub mod template {
    /// Placeholder role resolved to the concrete type of the live shader node
    pub const SHADER_PLACEHOLDER: &str = "{SHADER}";

    /// Separator between a role/type token and a socket name in references
    pub const REFERENCE_SEPARATOR: char = '.';

    /// Separator between segments of a property path
    pub const PATH_SEPARATOR: char = '.';
}

/// Node type tokens and socket names of the Blender-style shader graph
pub mod node {
    /// Material output node present in every material graph
    pub const OUTPUT_MATERIAL: &str = "ShaderNodeOutputMaterial";

    /// Default shader created together with a new material
    pub const BSDF_PRINCIPLED: &str = "ShaderNodeBsdfPrincipled";

    /// Glass shader
    pub const BSDF_GLASS: &str = "ShaderNodeBsdfGlass";

    /// Image-bearing texture node
    pub const TEX_IMAGE: &str = "ShaderNodeTexImage";

    /// Tangent space normal map node
    pub const NORMAL_MAP: &str = "ShaderNodeNormalMap";

    /// Channel splitter used for packed textures
    pub const SEPARATE_COLOR: &str = "ShaderNodeSeparateColor";

    /// Vector mapping node
    pub const MAPPING: &str = "ShaderNodeMapping";

    /// Texture coordinate source
    pub const TEX_COORD: &str = "ShaderNodeTexCoord";

    /// Color mix node
    pub const MIX: &str = "ShaderNodeMix";

    /// Output node input that carries the shader
    pub const SURFACE_SOCKET: &str = "Surface";

    /// Attribute of an image node holding the image resource
    pub const IMAGE_ATTRIBUTE: &str = "image";
}

/// Settings file location below the user's configuration directory
pub mod settings {
    /// Directory name under `dirs::config_dir()`
    pub const CONFIG_DIR_NAME: &str = "material_creator";

    /// Settings file name
    pub const FILE_NAME: &str = "settings.json";
}
