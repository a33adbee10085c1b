//! Template schema: material types, texture slots and their connection chains
//!
//! A template is parsed once per editing session and is immutable afterwards.
//! Parsing is all-or-nothing; a document with any malformed slot yields no
//! schema at all.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use super::path::PropertyPath;
use crate::constants::template::{REFERENCE_SEPARATOR, SHADER_PLACEHOLDER};
use crate::constants::DEFAULT_TYPE;
use crate::error::{SchemaError, SchemaResult};
use crate::host::Value;

/// `<NodeType>.<OutputSocket>`: the producer end of a hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub node_type: String,
    pub socket: String,
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.node_type, REFERENCE_SEPARATOR, self.socket)
    }
}

/// Role of the consumer end of a hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Whatever concrete shader node is live when the chain is compiled
    Shader,
    Type(String),
}

impl Role {
    /// Concrete type token once the shader type is known
    pub fn resolve<'a>(&'a self, shader_type: &'a str) -> &'a str {
        match self {
            Role::Shader => shader_type,
            Role::Type(token) => token,
        }
    }
}

/// `<Role>.<InputSocket>`: the consumer end of a hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRef {
    pub role: Role,
    pub socket: String,
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match &self.role {
            Role::Shader => SHADER_PLACEHOLDER,
            Role::Type(token) => token,
        };
        write!(f, "{}{}{}", role, REFERENCE_SEPARATOR, self.socket)
    }
}

/// One link of a chain: producer output into consumer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub output: OutputRef,
    pub input: InputRef,
}

/// Hops from the leaf node up to the shader node, in stored order.
///
/// Always non-empty, and the last hop is the only one feeding `{SHADER}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    hops: Vec<Hop>,
}

impl Chain {
    /// Hops in stored order (leaf end first)
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Hops in synthesis order: from the shader outwards
    pub fn hops_from_shader(&self) -> impl Iterator<Item = &Hop> {
        self.hops.iter().rev()
    }

    /// The hop wired directly into the shader node
    pub fn shader_hop(&self) -> &Hop {
        &self.hops[self.hops.len() - 1]
    }

    /// The hop whose producer is the chain's leaf node
    pub fn leaf_hop(&self) -> &Hop {
        &self.hops[0]
    }
}

/// Ordered property overrides for one role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBlock {
    entries: Vec<(PropertyPath, Value)>,
}

impl PropertyBlock {
    pub fn new(entries: Vec<(PropertyPath, Value)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(PropertyPath, Value)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named material input and the policy for wiring it into the shader
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlotSpec {
    pub slot_name: String,
    pub description: String,
    properties: Vec<(String, PropertyBlock)>,
    connections: Vec<Chain>,
}

impl TextureSlotSpec {
    pub fn connections(&self) -> &[Chain] {
        &self.connections
    }

    /// Overrides registered for a role token
    pub fn properties_for(&self, role: &str) -> Option<&PropertyBlock> {
        self.properties
            .iter()
            .find(|(token, _)| token == role)
            .map(|(_, block)| block)
    }

    /// Overrides for the live shader node: its concrete type first, then `{SHADER}`
    pub fn shader_properties(&self, shader_type: &str) -> Vec<&PropertyBlock> {
        [shader_type, SHADER_PLACEHOLDER]
            .iter()
            .filter_map(|role| self.properties_for(role))
            .collect()
    }

    /// Shader input sockets this slot wires, one per chain, deduplicated
    pub fn shader_sockets(&self) -> Vec<&str> {
        let mut sockets: Vec<&str> = Vec::new();
        for chain in &self.connections {
            let socket = chain.shader_hop().input.socket.as_str();
            if !sockets.contains(&socket) {
                sockets.push(socket);
            }
        }
        sockets
    }
}

/// Rules for one material type
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTypeSpec {
    pub name: String,
    pub suffix: String,
    pub required_slots: Vec<TextureSlotSpec>,
    pub optional_slots: Vec<TextureSlotSpec>,
}

impl MaterialTypeSpec {
    /// The implicit type used when nothing else matches: no suffix, no slots
    pub fn fallback() -> Self {
        Self {
            name: DEFAULT_TYPE.to_string(),
            suffix: String::new(),
            required_slots: Vec::new(),
            optional_slots: Vec::new(),
        }
    }

    /// Required slots, followed by optional slots when requested
    pub fn slots(&self, include_optional: bool) -> impl Iterator<Item = &TextureSlotSpec> {
        let optional: &[TextureSlotSpec] = if include_optional {
            &self.optional_slots
        } else {
            &[]
        };
        self.required_slots.iter().chain(optional.iter())
    }

    /// Look a slot up among required and optional slots
    pub fn slot(&self, slot_name: &str) -> Option<&TextureSlotSpec> {
        self.slots(true).find(|slot| slot.slot_name == slot_name)
    }

    pub fn matches_name(&self, material_name: &str) -> bool {
        material_name.ends_with(&self.suffix)
    }

    /// Material name carrying this type's suffix exactly once
    pub fn decorate(&self, base_name: &str) -> String {
        if self.suffix.is_empty() || base_name.ends_with(&self.suffix) {
            base_name.to_string()
        } else {
            format!("{base_name}{}", self.suffix)
        }
    }

    /// Material name without this type's suffix
    pub fn strip<'a>(&self, material_name: &'a str) -> &'a str {
        if self.suffix.is_empty() {
            return material_name;
        }
        material_name
            .strip_suffix(self.suffix.as_str())
            .unwrap_or(material_name)
    }
}

/// The parsed template document
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    material_types: Vec<MaterialTypeSpec>,
    node_attributes: BTreeMap<String, String>,
    fallback: MaterialTypeSpec,
}

impl Template {
    /// Parse a template from JSON text
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(document)
    }

    /// Read and parse a template file
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let template = Self::from_json_str(&text)?;
        info!(
            "Loaded template {} with {} material types",
            path.display(),
            template.material_types.len()
        );
        Ok(template)
    }

    /// Build a template from an already parsed document
    pub fn from_value(document: serde_json::Value) -> SchemaResult<Self> {
        let raw: RawTemplate = serde_json::from_value(document)?;

        let mut material_types = Vec::with_capacity(raw.material_config.material_types.len());
        for (name, raw_type) in raw.material_config.material_types {
            let raw_type: RawMaterialType = serde_json::from_value(raw_type)?;
            material_types.push(build_material_type(name, raw_type)?);
        }

        debug!(
            "Parsed {} material types: {:?}",
            material_types.len(),
            material_types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            material_types,
            node_attributes: raw.shader_config.node_attributes,
            fallback: MaterialTypeSpec::fallback(),
        })
    }

    /// Material types in document order
    pub fn material_types(&self) -> &[MaterialTypeSpec] {
        &self.material_types
    }

    /// Look a type up by name. The `default` type always resolves.
    pub fn get(&self, name: &str) -> Option<&MaterialTypeSpec> {
        self.material_types
            .iter()
            .find(|t| t.name == name)
            .or_else(|| (name == DEFAULT_TYPE).then_some(&self.fallback))
    }

    /// Infer a material's type from its name suffix.
    ///
    /// The first declared type whose non-empty suffix ends the name wins.
    /// Types with an empty suffix only act as a fallback, before the implicit
    /// `default` type.
    pub fn infer_type(&self, material_name: &str) -> &MaterialTypeSpec {
        self.material_types
            .iter()
            .find(|t| !t.suffix.is_empty() && t.matches_name(material_name))
            .or_else(|| self.material_types.iter().find(|t| t.suffix.is_empty()))
            .unwrap_or(&self.fallback)
    }

    /// Opaque shader configuration carried through from the document
    pub fn node_attributes(&self) -> &BTreeMap<String, String> {
        &self.node_attributes
    }
}

#[derive(Deserialize)]
struct RawTemplate {
    material_config: RawMaterialConfig,
    shader_config: RawShaderConfig,
}

#[derive(Deserialize)]
struct RawMaterialConfig {
    material_types: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawShaderConfig {
    node_attributes: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawMaterialType {
    suffix: String,
    required_texture_slots: Vec<RawSlot>,
    optional_texture_slots: Vec<RawSlot>,
}

#[derive(Deserialize)]
struct RawSlot {
    slot_name: String,
    description: String,
    properties: serde_json::Map<String, serde_json::Value>,
    connections: Vec<Vec<(String, String)>>,
}

fn build_material_type(name: String, raw: RawMaterialType) -> SchemaResult<MaterialTypeSpec> {
    let mut seen = BTreeSet::new();
    let mut build_slots = |raw_slots: Vec<RawSlot>| -> SchemaResult<Vec<TextureSlotSpec>> {
        raw_slots
            .into_iter()
            .map(|raw_slot| {
                if !seen.insert(raw_slot.slot_name.clone()) {
                    return Err(SchemaError::DuplicateSlot {
                        material_type: name.clone(),
                        slot: raw_slot.slot_name,
                    });
                }
                build_slot(&name, raw_slot)
            })
            .collect()
    };

    let required_slots = build_slots(raw.required_texture_slots)?;
    let optional_slots = build_slots(raw.optional_texture_slots)?;

    Ok(MaterialTypeSpec {
        name,
        suffix: raw.suffix,
        required_slots,
        optional_slots,
    })
}

/// Validation context for one slot, used to build error values
struct SlotContext<'a> {
    material_type: &'a str,
    slot: &'a str,
}

impl SlotContext<'_> {
    fn malformed(&self, reference: &str) -> SchemaError {
        SchemaError::MalformedReference {
            material_type: self.material_type.to_string(),
            slot: self.slot.to_string(),
            reference: reference.to_string(),
        }
    }

    fn undefined_role(&self, role: &str) -> SchemaError {
        SchemaError::UndefinedRole {
            material_type: self.material_type.to_string(),
            slot: self.slot.to_string(),
            role: role.to_string(),
        }
    }
}

fn build_slot(material_type: &str, raw: RawSlot) -> SchemaResult<TextureSlotSpec> {
    let ctx = SlotContext {
        material_type,
        slot: &raw.slot_name,
    };

    let connections = raw
        .connections
        .iter()
        .enumerate()
        .map(|(index, hops)| build_chain(&ctx, index, hops))
        .collect::<SchemaResult<Vec<_>>>()?;

    let mut roles: BTreeSet<&str> = connections
        .iter()
        .flat_map(|chain| chain.hops().iter().map(|hop| hop.output.node_type.as_str()))
        .collect();
    roles.insert(SHADER_PLACEHOLDER);

    let mut properties = Vec::with_capacity(raw.properties.len());
    for (role, block) in &raw.properties {
        if !roles.contains(role.as_str()) {
            return Err(ctx.undefined_role(role));
        }
        properties.push((role.clone(), build_property_block(&ctx, role, block)?));
    }

    Ok(TextureSlotSpec {
        slot_name: raw.slot_name.clone(),
        description: raw.description,
        properties,
        connections,
    })
}

fn build_chain(
    ctx: &SlotContext<'_>,
    index: usize,
    raw: &[(String, String)],
) -> SchemaResult<Chain> {
    if raw.is_empty() {
        return Err(SchemaError::EmptyChain {
            material_type: ctx.material_type.to_string(),
            slot: ctx.slot.to_string(),
            chain: index,
        });
    }

    let hops = raw
        .iter()
        .map(|(output, input)| {
            Ok(Hop {
                output: parse_output_ref(ctx, output)?,
                input: parse_input_ref(ctx, input)?,
            })
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    let shader_hops = hops.iter().filter(|hop| hop.input.role == Role::Shader).count();
    if shader_hops != 1 {
        return Err(SchemaError::ShaderHopCount {
            material_type: ctx.material_type.to_string(),
            slot: ctx.slot.to_string(),
            chain: index,
            count: shader_hops,
        });
    }
    if hops[hops.len() - 1].input.role != Role::Shader {
        return Err(SchemaError::ShaderHopNotLast {
            material_type: ctx.material_type.to_string(),
            slot: ctx.slot.to_string(),
            chain: index,
        });
    }

    // Every inner hop is anchored on the producer of the hop after it.
    for pair in hops.windows(2) {
        let (inner, outer) = (&pair[0], &pair[1]);
        match &inner.input.role {
            Role::Type(token) if *token == outer.output.node_type => {}
            Role::Type(token) => return Err(ctx.undefined_role(token)),
            Role::Shader => return Err(ctx.undefined_role(SHADER_PLACEHOLDER)),
        }
    }

    Ok(Chain { hops })
}

fn split_reference<'r>(
    ctx: &SlotContext<'_>,
    reference: &'r str,
) -> SchemaResult<(&'r str, &'r str)> {
    match reference.split_once(REFERENCE_SEPARATOR) {
        Some((token, socket)) if !token.is_empty() && !socket.is_empty() => Ok((token, socket)),
        _ => Err(ctx.malformed(reference)),
    }
}

fn parse_output_ref(ctx: &SlotContext<'_>, reference: &str) -> SchemaResult<OutputRef> {
    let (node_type, socket) = split_reference(ctx, reference)?;
    if node_type.contains(SHADER_PLACEHOLDER) {
        return Err(ctx.malformed(reference));
    }
    Ok(OutputRef {
        node_type: node_type.to_string(),
        socket: socket.to_string(),
    })
}

fn parse_input_ref(ctx: &SlotContext<'_>, reference: &str) -> SchemaResult<InputRef> {
    let (role, socket) = split_reference(ctx, reference)?;
    let role = if role == SHADER_PLACEHOLDER {
        Role::Shader
    } else if role.contains(SHADER_PLACEHOLDER) {
        return Err(ctx.malformed(reference));
    } else {
        Role::Type(role.to_string())
    };
    Ok(InputRef {
        role,
        socket: socket.to_string(),
    })
}

fn build_property_block(
    ctx: &SlotContext<'_>,
    role: &str,
    raw: &serde_json::Value,
) -> SchemaResult<PropertyBlock> {
    let entries = raw.as_object().ok_or_else(|| SchemaError::UnsupportedValue {
        material_type: ctx.material_type.to_string(),
        slot: ctx.slot.to_string(),
        path: role.to_string(),
    })?;

    entries
        .iter()
        .map(|(path, value)| {
            let parsed: PropertyPath =
                path.parse()
                    .map_err(|reason| SchemaError::InvalidPropertyPath {
                        material_type: ctx.material_type.to_string(),
                        slot: ctx.slot.to_string(),
                        path: path.clone(),
                        reason,
                    })?;
            let value = Value::from_json(value).ok_or_else(|| SchemaError::UnsupportedValue {
                material_type: ctx.material_type.to_string(),
                slot: ctx.slot.to_string(),
                path: path.clone(),
            })?;
            Ok((parsed, value))
        })
        .collect::<SchemaResult<Vec<_>>>()
        .map(PropertyBlock::new)
}
