//! Topological sort of the dummy-stripped graph.
//!
//! Kahn's algorithm with ties among simultaneously-ready nodes broken by
//! insertion order of the node list, so repeated compilations of the same
//! graph produce identical output.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::error::CompileError;
use crate::parse::graph::FlowGraph;

pub fn topo_sort(flow: &FlowGraph) -> Result<Vec<String>, Vec<CompileError>> {
    let graph = &flow.graph;

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
        .collect();

    // Min-heap over insertion indices: the lowest-index ready node wins.
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(i)) = ready.pop() {
        let idx = NodeIndex::new(i);
        order.push(graph[idx].clone());
        for edge in graph.edges_directed(idx, Direction::Outgoing) {
            let target = edge.target().index();
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                ready.push(Reverse(target));
            }
        }
    }

    if order.len() < graph.node_count() {
        let culprit = graph
            .node_indices()
            .find(|idx| in_degree[idx.index()] > 0)
            .map(|idx| graph[idx].clone());
        let at = culprit.clone().unwrap_or_default();
        return Err(vec![CompileError::sort(
            "S001",
            format!("Cycle detected at node '{}'", at),
            culprit,
        )]);
    }

    Ok(order)
}
