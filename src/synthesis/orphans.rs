//! Orphan collector
//!
//! Removes the subgraphs feeding shader inputs that a synthesis pass left
//! untouched. The removal order is planned before the graph is modified, so a
//! rejected plan leaves the graph as it was.

use std::collections::HashSet;

use log::{debug, info};

use super::locator::cycle_at;
use crate::error::{SynthesisError, SynthesisResult};
use crate::host::GraphHost;

/// Remove the subgraphs feeding the shader inputs named in `orphan_sockets`,
/// children before parents.
///
/// Each orphan subgraph must be a tree that shares no node with the part of
/// the graph still reachable from `shader` through its other inputs;
/// otherwise nothing is removed and [`SynthesisError::SharedSubgraph`] is
/// returned. Returns the number of removed nodes.
pub fn collect<H: GraphHost>(
    host: &mut H,
    shader: H::Node,
    orphan_sockets: &[String],
) -> SynthesisResult<usize> {
    let mut roots = Vec::new();
    for socket in orphan_sockets {
        if let Some(link) = host.input_link(shader, socket) {
            if !roots.contains(&link.from_node) {
                roots.push(link.from_node);
            }
        }
    }
    if roots.is_empty() {
        return Ok(0);
    }

    let live = live_nodes(&*host, shader, orphan_sockets)?;
    let mut planner = RemovalPlan {
        host: &*host,
        live: &live,
        on_path: HashSet::new(),
        planned: HashSet::new(),
        order: Vec::new(),
    };
    for root in &roots {
        planner.plan(*root)?;
    }
    let order = planner.order;

    for node in &order {
        debug!("Removing orphaned node {:?}", node);
        host.remove_node(*node)?;
    }
    info!("Removed {} orphaned node(s)", order.len());
    Ok(order.len())
}

/// The shader and everything upstream of its inputs, except the orphaned ones
fn live_nodes<H: GraphHost>(
    host: &H,
    shader: H::Node,
    orphan_sockets: &[String],
) -> SynthesisResult<HashSet<H::Node>> {
    let mut live = HashSet::new();
    let mut on_path = HashSet::new();
    live.insert(shader);
    on_path.insert(shader);
    for socket in host.input_names(shader) {
        if orphan_sockets.contains(&socket) {
            continue;
        }
        if let Some(link) = host.input_link(shader, &socket) {
            mark_live(host, link.from_node, &mut live, &mut on_path)?;
        }
    }
    Ok(live)
}

fn mark_live<H: GraphHost>(
    host: &H,
    node: H::Node,
    live: &mut HashSet<H::Node>,
    on_path: &mut HashSet<H::Node>,
) -> SynthesisResult<()> {
    if on_path.contains(&node) {
        return Err(cycle_at(host, node).into());
    }
    if !live.insert(node) {
        return Ok(());
    }

    on_path.insert(node);
    for socket in host.input_names(node) {
        if let Some(link) = host.input_link(node, &socket) {
            mark_live(host, link.from_node, live, on_path)?;
        }
    }
    on_path.remove(&node);
    Ok(())
}

struct RemovalPlan<'p, H: GraphHost> {
    host: &'p H,
    live: &'p HashSet<H::Node>,
    on_path: HashSet<H::Node>,
    planned: HashSet<H::Node>,
    order: Vec<H::Node>,
}

impl<H: GraphHost> RemovalPlan<'_, H> {
    fn plan(&mut self, node: H::Node) -> SynthesisResult<()> {
        if self.on_path.contains(&node) {
            return Err(cycle_at(self.host, node).into());
        }
        if self.live.contains(&node) || self.planned.contains(&node) {
            return Err(SynthesisError::SharedSubgraph {
                node: format!("{node:?}"),
                node_type: self.host.node_type(node).unwrap_or_default().to_string(),
            });
        }

        self.on_path.insert(node);
        for socket in self.host.input_names(node) {
            if let Some(link) = self.host.input_link(node, &socket) {
                self.plan(link.from_node)?;
            }
        }
        self.on_path.remove(&node);

        self.planned.insert(node);
        self.order.push(node);
        Ok(())
    }
}
