//! Derivation of the deduplicated node/link graph from the rendered forest.

use std::collections::{HashMap, HashSet};

use crate::models::{Graph, GraphLink, GraphNode, LinkCategory};
use crate::sync::Forest;

/// Rendering surface fed with the derived graph.
pub trait GraphSink {
    fn display_graph(&mut self, graph: &Graph);
}

/// Derive the deduplicated node and link collections from the forest.
///
/// Pure function of the tree: never mutates it and performs no I/O, so it is
/// safe to call on every render frame.
///
/// Nodes are collected in depth-first pre-order and deduplicated by neuron id,
/// the first occurrence's tag winning. Links come from a second pre-order pass
/// over relation nodes, deduplicated by `(source, target)` endpoint pair with
/// the first-seen category winning. A link whose endpoint id is absent from
/// the node set is dropped with a warning.
pub fn extract(forest: &Forest) -> Graph {
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    forest.visit(|node| {
        if !index_by_id.contains_key(&node.neuron.id) {
            index_by_id.insert(node.neuron.id.clone(), nodes.len());
            nodes.push(GraphNode {
                id: node.neuron.id.clone(),
                tag: node.neuron.tag.clone(),
            });
        }
    });

    let mut links: Vec<GraphLink> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    forest.visit(|node| {
        if !node.neuron.is_relative() {
            return;
        }
        let Some(terminal) = node.neuron.terminal.as_ref() else {
            tracing::warn!(neuron = %node.neuron.id, "relation neuron without terminal data");
            return;
        };
        let (Some(&source), Some(&target)) = (
            index_by_id.get(&terminal.presynaptic_neuron_id),
            index_by_id.get(&terminal.postsynaptic_neuron_id),
        ) else {
            tracing::warn!(
                terminal = %terminal.id,
                "dropping link with an endpoint outside the rendered tree"
            );
            return;
        };
        if seen.insert((source, target)) {
            links.push(GraphLink {
                source,
                target,
                category: LinkCategory::from_terminal(terminal),
            });
        }
    });

    Graph { nodes, links }
}
