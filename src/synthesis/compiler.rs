//! Slot connection compiler
//!
//! Expands one texture slot's chains into node creation, link and property
//! operations against the live graph. Every chain starts at the shader node
//! and walks outwards, reusing a producer already reachable from the socket it
//! wires before creating a new one.

use log::{debug, warn};

use super::locator;
use super::properties::{self, ApplyReport};
use crate::error::{SocketDirection, SynthesisError, SynthesisResult};
use crate::host::GraphHost;
use crate::template::{Chain, Role, TextureSlotSpec};

/// A chain that could not be completed
#[derive(Debug)]
pub struct ChainFailure {
    pub slot: String,
    pub chain: usize,
    pub error: SynthesisError,
}

/// Outcome of compiling one slot
#[derive(Debug, Default)]
pub struct SlotCompilation {
    /// Shader input sockets wired or confirmed, in chain order
    pub touched: Vec<String>,
    pub failures: Vec<ChainFailure>,
    /// Nodes created by this slot
    pub created: usize,
    pub properties: ApplyReport,
}

/// Compile every chain of `slot` against `shader`.
///
/// Fails only when there is no shader node; a failing chain is recorded in
/// the returned compilation and the remaining chains still run.
pub fn compile<H: GraphHost>(
    host: &mut H,
    slot: &TextureSlotSpec,
    shader: Option<H::Node>,
) -> SynthesisResult<SlotCompilation> {
    let shader = shader.ok_or(SynthesisError::ShaderNodeNotFound)?;
    let shader_type = host
        .node_type(shader)
        .ok_or(SynthesisError::ShaderNodeNotFound)?
        .to_string();

    let mut outcome = SlotCompilation::default();
    for (index, chain) in slot.connections().iter().enumerate() {
        let mut compiler = ChainCompiler {
            host: &mut *host,
            slot,
            shader_type: &shader_type,
            outcome: &mut outcome,
        };
        if let Err(error) = compiler.compile(shader, chain) {
            warn!(
                "Slot '{}': connection {} aborted: {}",
                slot.slot_name, index, error
            );
            outcome.failures.push(ChainFailure {
                slot: slot.slot_name.clone(),
                chain: index,
                error,
            });
        }
    }
    Ok(outcome)
}

struct ChainCompiler<'c, H: GraphHost> {
    host: &'c mut H,
    slot: &'c TextureSlotSpec,
    shader_type: &'c str,
    outcome: &'c mut SlotCompilation,
}

impl<H: GraphHost> ChainCompiler<'_, H> {
    fn compile(&mut self, shader: H::Node, chain: &Chain) -> SynthesisResult<()> {
        let mut anchor = shader;
        for (step, hop) in chain.hops_from_shader().enumerate() {
            let socket = hop.input.socket.as_str();
            if !self.host.has_input(anchor, socket) {
                return Err(self.missing_socket(anchor, socket, SocketDirection::Input));
            }
            if step == 0 && !self.outcome.touched.iter().any(|touched| touched == socket) {
                self.outcome.touched.push(socket.to_string());
            }

            let producer_type = hop.output.node_type.as_str();
            let existing = match self.host.input_link(anchor, socket) {
                Some(link) => locator::find_first(&*self.host, link.from_node, producer_type)?,
                None => None,
            };
            let producer = match existing {
                Some(node) => {
                    debug!("Reusing {} {:?} for '{}'", producer_type, node, socket);
                    node
                }
                None => self.create(producer_type, &hop.output.socket)?,
            };
            if !self.host.has_output(producer, &hop.output.socket) {
                return Err(self.missing_socket(
                    producer,
                    &hop.output.socket,
                    SocketDirection::Output,
                ));
            }

            let linked = self.host.input_link(anchor, socket).is_some_and(|link| {
                link.from_node == producer && link.from_socket == hop.output.socket
            });
            if !linked {
                self.host.connect(producer, &hop.output.socket, anchor, socket)?;
                debug!("Linked {} into '{}'", hop.output, socket);
            }

            // Intermediate anchors were configured as producers of the previous hop.
            if step == 0 {
                self.apply_role(anchor, &hop.input.role);
            }
            self.apply_role(producer, &Role::Type(producer_type.to_string()));

            anchor = producer;
        }
        Ok(())
    }

    /// Create a producer node, removing it again if it lacks the output to link
    fn create(&mut self, node_type: &str, output: &str) -> SynthesisResult<H::Node> {
        let node = self.host.create_node(node_type)?;
        if !self.host.has_output(node, output) {
            let error = self.missing_socket(node, output, SocketDirection::Output);
            self.host.remove_node(node)?;
            return Err(error);
        }
        self.outcome.created += 1;
        debug!("Created {} {:?}", node_type, node);
        Ok(node)
    }

    fn apply_role(&mut self, node: H::Node, role: &Role) {
        let slot = self.slot;
        let blocks = match role {
            Role::Shader => slot.shader_properties(self.shader_type),
            Role::Type(token) => slot.properties_for(token).into_iter().collect(),
        };
        for block in blocks {
            let report = properties::apply(&mut *self.host, node, block);
            self.outcome.properties.absorb(report);
        }
    }

    fn missing_socket(
        &self,
        node: H::Node,
        socket: &str,
        direction: SocketDirection,
    ) -> SynthesisError {
        SynthesisError::MissingSocket {
            node_type: self.host.node_type(node).unwrap_or_default().to_string(),
            socket: socket.to_string(),
            direction,
        }
    }
}
