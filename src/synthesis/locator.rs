//! Upstream node search
//!
//! Both searches walk input sockets in declaration order and follow each
//! link to its source node, depth first. A node is explored at most once per
//! search, so shared (diamond) producers are fine; reaching a node that is
//! still on the current path is a link cycle and fails the search.

use std::collections::HashSet;

use crate::error::CyclicGraphError;
use crate::host::GraphHost;

/// The first node of `target_type` at or upstream of `start`
pub fn find_first<H: GraphHost>(
    host: &H,
    start: H::Node,
    target_type: &str,
) -> Result<Option<H::Node>, CyclicGraphError> {
    let mut search = Search::new(host, target_type, true);
    search.visit(start)?;
    Ok(search.found.pop())
}

/// Every node of `target_type` upstream of `start`, without descending past
/// a match
pub fn find_all<H: GraphHost>(
    host: &H,
    start: H::Node,
    target_type: &str,
) -> Result<Vec<H::Node>, CyclicGraphError> {
    let mut search = Search::new(host, target_type, false);
    search.visit(start)?;
    Ok(search.found)
}

struct Search<'h, H: GraphHost> {
    host: &'h H,
    target_type: &'h str,
    first_only: bool,
    on_path: HashSet<H::Node>,
    explored: HashSet<H::Node>,
    found: Vec<H::Node>,
}

impl<'h, H: GraphHost> Search<'h, H> {
    fn new(host: &'h H, target_type: &'h str, first_only: bool) -> Self {
        Self {
            host,
            target_type,
            first_only,
            on_path: HashSet::new(),
            explored: HashSet::new(),
            found: Vec::new(),
        }
    }

    /// Returns `true` once the search is complete
    fn visit(&mut self, node: H::Node) -> Result<bool, CyclicGraphError> {
        if self.on_path.contains(&node) {
            return Err(cycle_at(self.host, node));
        }
        if !self.explored.insert(node) {
            return Ok(false);
        }

        if self.host.node_type(node) == Some(self.target_type) {
            self.found.push(node);
            return Ok(self.first_only);
        }

        self.on_path.insert(node);
        for socket in self.host.input_names(node) {
            if let Some(link) = self.host.input_link(node, &socket) {
                if self.visit(link.from_node)? {
                    return Ok(true);
                }
            }
        }
        self.on_path.remove(&node);
        Ok(false)
    }
}

pub(crate) fn cycle_at<H: GraphHost>(host: &H, node: H::Node) -> CyclicGraphError {
    CyclicGraphError {
        node: format!("{node:?}"),
        node_type: host.node_type(node).unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::node;
    use crate::nodes::test_support::TestGraph;

    #[test]
    fn test_find_first_matches_start_and_upstream() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let image = host.create_node(node::TEX_IMAGE).unwrap();
        let normal_map = host.create_node(node::NORMAL_MAP).unwrap();
        host.connect(image, "Color", normal_map, "Color").unwrap();

        assert_eq!(find_first(&host, normal_map, node::NORMAL_MAP).unwrap(), Some(normal_map));
        assert_eq!(find_first(&host, normal_map, node::TEX_IMAGE).unwrap(), Some(image));
        assert_eq!(find_first(&host, normal_map, node::MAPPING).unwrap(), None);
    }

    #[test]
    fn test_find_first_follows_socket_declaration_order() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let mix = host.create_node(node::MIX).unwrap();
        let on_b = host.create_node(node::TEX_IMAGE).unwrap();
        let on_a = host.create_node(node::TEX_IMAGE).unwrap();
        host.connect(on_b, "Color", mix, "B").unwrap();
        host.connect(on_a, "Color", mix, "A").unwrap();

        // `A` is declared before `B`, whatever the link creation order.
        assert_eq!(find_first(&host, mix, node::TEX_IMAGE).unwrap(), Some(on_a));
        assert_eq!(find_all(&host, mix, node::TEX_IMAGE).unwrap(), vec![on_a, on_b]);
    }

    #[test]
    fn test_find_all_stops_at_first_match_per_branch() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let mix = host.create_node(node::MIX).unwrap();
        let inner = host.create_node(node::MIX).unwrap();
        let image = host.create_node(node::TEX_IMAGE).unwrap();
        host.connect(inner, "Result", mix, "A").unwrap();
        host.connect(image, "Color", inner, "A").unwrap();

        assert_eq!(find_all(&host, mix, node::MIX).unwrap(), vec![mix]);
        assert_eq!(find_all(&host, mix, node::TEX_IMAGE).unwrap(), vec![image]);
    }

    #[test]
    fn test_shared_producer_is_not_a_cycle() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let mix = host.create_node(node::MIX).unwrap();
        let separate = host.create_node(node::SEPARATE_COLOR).unwrap();
        host.connect(separate, "Red", mix, "Factor").unwrap();
        host.connect(separate, "Green", mix, "A").unwrap();

        assert_eq!(find_all(&host, mix, node::SEPARATE_COLOR).unwrap(), vec![separate]);
        assert_eq!(find_first(&host, mix, node::TEX_IMAGE).unwrap(), None);
    }

    #[test]
    fn test_link_cycle_is_reported() {
        let mut fixture = TestGraph::new();
        let mut host = fixture.host();
        let first = host.create_node(node::MAPPING).unwrap();
        let second = host.create_node(node::MAPPING).unwrap();
        host.connect(first, "Vector", second, "Vector").unwrap();
        host.connect(second, "Vector", first, "Vector").unwrap();

        let err = find_first(&host, first, node::TEX_IMAGE).unwrap_err();
        assert_eq!(err.node_type, node::MAPPING);
        assert!(find_all(&host, second, node::TEX_IMAGE).is_err());
    }
}
