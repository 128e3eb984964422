//! Batch ("scatter") propagation.
//!
//! A pure flood fill over the full flattened graph, dummy nodes included
//! since a dataset selector can be a scatter source. Any node reachable
//! from a scatter-enabled source node is scattered, regardless of which
//! specific input is wired; no type reasoning happens here.

use std::collections::{HashSet, VecDeque};

use crate::parse::graph::FlowGraph;
use crate::parse::types::Graph;

pub struct ScatterSets {
    pub scattered: HashSet<String>,
    pub sources: HashSet<String>,
}

pub fn propagate(graph: &Graph, flow: &FlowGraph) -> ScatterSets {
    let mut sources = HashSet::new();
    for node in &graph.nodes {
        if flow.incoming_count(&node.id) == 0 {
            sources.insert(node.id.clone());
        }
    }

    let mut scattered = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    for node in &graph.nodes {
        if node.is_scatter_source && sources.contains(&node.id) {
            scattered.insert(node.id.clone());
            queue.push_back(node.id.clone());
        }
    }

    while let Some(id) = queue.pop_front() {
        for successor in flow.successors(&id) {
            if scattered.insert(successor.to_string()) {
                queue.push_back(successor.to_string());
            }
        }
    }

    ScatterSets { scattered, sources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{Edge, EdgeMapping, Node};

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            mappings: vec![EdgeMapping {
                source_output: "output".into(),
                target_input: "input".into(),
            }],
        }
    }

    fn scatter_node(id: &str, tool: &str) -> Node {
        let mut node = Node::new(id, tool);
        node.is_scatter_source = true;
        node
    }

    #[test]
    fn floods_downstream_from_enabled_source() {
        let graph = Graph {
            nodes: vec![
                scatter_node("a", "t"),
                Node::new("b", "t"),
                Node::new("c", "t"),
            ],
            edges: vec![edge("e1", "a", "b"), edge("e2", "b", "c")],
        };
        let flow = FlowGraph::build(&graph).unwrap();
        let sets = propagate(&graph, &flow);
        assert!(sets.scattered.contains("a"));
        assert!(sets.scattered.contains("b"));
        assert!(sets.scattered.contains("c"));
    }

    #[test]
    fn disabled_source_scatters_nothing() {
        let graph = Graph {
            nodes: vec![Node::new("a", "t"), Node::new("b", "t")],
            edges: vec![edge("e1", "a", "b")],
        };
        let flow = FlowGraph::build(&graph).unwrap();
        let sets = propagate(&graph, &flow);
        assert!(sets.scattered.is_empty());
        assert!(sets.sources.contains("a"));
        assert!(!sets.sources.contains("b"));
    }

    #[test]
    fn scatter_flag_on_non_source_is_ignored() {
        let graph = Graph {
            nodes: vec![Node::new("a", "t"), scatter_node("b", "t")],
            edges: vec![edge("e1", "a", "b")],
        };
        let flow = FlowGraph::build(&graph).unwrap();
        let sets = propagate(&graph, &flow);
        assert!(sets.scattered.is_empty());
    }
}
