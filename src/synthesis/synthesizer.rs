//! Node graph synthesizer
//!
//! Runs the slot compiler over the slots of a material type and works out
//! which shader inputs were left behind by the pass.

use log::{debug, info, warn};

use super::compiler::{self, SlotCompilation};
use super::orphans;
use super::properties::ApplyReport;
use crate::config::Settings;
use crate::error::{SynthesisError, SynthesisResult};
use crate::host::{find_shader_node, GraphHost};
use crate::template::{MaterialTypeSpec, TextureSlotSpec};

/// A slot, or one chain of it, that could not be synthesized
#[derive(Debug)]
pub struct SlotFailure {
    pub slot: String,
    /// Failing chain, or `None` when the whole slot was skipped
    pub chain: Option<usize>,
    pub error: SynthesisError,
}

/// Outcome of a synthesis pass.
///
/// A report with failures describes a graph that is in a known but
/// incomplete state; nothing is rolled back.
#[derive(Debug)]
pub struct SynthesisReport<N> {
    /// Concrete type of the shader node the pass ran against
    pub shader_type: Option<String>,
    /// Shader input sockets wired or confirmed by the pass
    pub touched: Vec<String>,
    pub failures: Vec<SlotFailure>,
    /// Linked shader inputs the pass did not touch
    pub orphan_sockets: Vec<String>,
    /// Producers linked into those inputs
    pub orphan_roots: Vec<N>,
    pub created: usize,
    pub removed: usize,
    pub properties: ApplyReport,
}

impl<N> Default for SynthesisReport<N> {
    fn default() -> Self {
        Self {
            shader_type: None,
            touched: Vec::new(),
            failures: Vec::new(),
            orphan_sockets: Vec::new(),
            orphan_roots: Vec::new(),
            created: 0,
            removed: 0,
            properties: ApplyReport::default(),
        }
    }
}

impl<N> SynthesisReport<N> {
    /// Whether every chain of every slot compiled
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, compilation: SlotCompilation) {
        for socket in compilation.touched {
            if !self.touched.contains(&socket) {
                self.touched.push(socket);
            }
        }
        self.failures
            .extend(compilation.failures.into_iter().map(|failure| SlotFailure {
                slot: failure.slot,
                chain: Some(failure.chain),
                error: failure.error,
            }));
        self.created += compilation.created;
        self.properties.absorb(compilation.properties);
    }
}

/// Synthesis of one material type against the graphs of a host
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    material_type: &'a MaterialTypeSpec,
    settings: &'a Settings,
}

impl<'a> Synthesizer<'a> {
    pub fn new(material_type: &'a MaterialTypeSpec, settings: &'a Settings) -> Self {
        Self {
            material_type,
            settings,
        }
    }

    pub fn material_type(&self) -> &'a MaterialTypeSpec {
        self.material_type
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// The shader node of the host graph, discovered afresh
    pub fn shader_node<H: GraphHost>(&self, host: &H) -> Option<H::Node> {
        find_shader_node(
            host,
            &self.settings.output_node_type,
            &self.settings.surface_socket,
        )
    }

    /// Compile the required slots (and optional ones when asked) and report
    /// the orphan roots left behind. Nothing is removed.
    pub fn synthesize<H: GraphHost>(
        &self,
        host: &mut H,
        include_optional: bool,
    ) -> SynthesisReport<H::Node> {
        let mut report = SynthesisReport::default();
        for slot in self.material_type.slots(include_optional) {
            self.run_slot(host, slot, &mut report);
        }

        if let Some(shader) = self.shader_node(&*host) {
            report.shader_type = host.node_type(shader).map(str::to_string);
            for socket in host.input_names(shader) {
                if report.touched.contains(&socket) {
                    continue;
                }
                if let Some(link) = host.input_link(shader, &socket) {
                    debug!("Socket '{}' is no longer driven by a slot", socket);
                    if !report.orphan_roots.contains(&link.from_node) {
                        report.orphan_roots.push(link.from_node);
                    }
                    report.orphan_sockets.push(socket);
                }
            }
        }

        info!(
            "Synthesized '{}': {} socket(s) touched, {} node(s) created, {} failure(s)",
            self.material_type.name,
            report.touched.len(),
            report.created,
            report.failures.len()
        );
        report
    }

    /// Compile a single slot, required or optional. No orphan roots are
    /// computed, since the other slots were not part of the pass.
    pub fn synthesize_slot<H: GraphHost>(
        &self,
        host: &mut H,
        slot_name: &str,
    ) -> SynthesisResult<SynthesisReport<H::Node>> {
        let slot = self
            .material_type
            .slot(slot_name)
            .ok_or_else(|| SynthesisError::UnknownSlot(slot_name.to_string()))?;

        let mut report = SynthesisReport::default();
        self.run_slot(host, slot, &mut report);
        report.shader_type = self
            .shader_node(&*host)
            .and_then(|shader| host.node_type(shader))
            .map(str::to_string);
        Ok(report)
    }

    /// Synthesize, then remove every orphaned subgraph
    pub fn reconcile<H: GraphHost>(
        &self,
        host: &mut H,
        include_optional: bool,
    ) -> SynthesisResult<SynthesisReport<H::Node>> {
        let mut report = self.synthesize(host, include_optional);
        if let Some(shader) = self.shader_node(&*host) {
            report.removed = orphans::collect(host, shader, &report.orphan_sockets)?;
        }
        Ok(report)
    }

    fn run_slot<H: GraphHost>(
        &self,
        host: &mut H,
        slot: &TextureSlotSpec,
        report: &mut SynthesisReport<H::Node>,
    ) {
        let shader = self.shader_node(&*host);
        match compiler::compile(host, slot, shader) {
            Ok(compilation) => report.absorb(compilation),
            Err(error) => {
                warn!("Slot '{}' skipped: {}", slot.slot_name, error);
                report.failures.push(SlotFailure {
                    slot: slot.slot_name.clone(),
                    chain: None,
                    error,
                });
            }
        }
    }
}
