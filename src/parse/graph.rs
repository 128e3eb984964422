//! petgraph-based directed graph wrapper for the canvas graph.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{EdgeMapping, Graph};
use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub edge_id: String,
    pub mappings: Vec<EdgeMapping>,
}

#[derive(Debug)]
pub struct FlowGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl FlowGraph {
    pub fn build(input: &Graph) -> Result<Self, Vec<CompileError>> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut errors = Vec::new();

        for node in &input.nodes {
            let id = node.id.clone();
            let idx = graph.add_node(id.clone());
            node_indices.insert(id, idx);
        }

        for edge in &input.edges {
            let source_idx = node_indices.get(&edge.source);
            let target_idx = node_indices.get(&edge.target);

            match (source_idx, target_idx) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(
                        s,
                        t,
                        EdgeLabel {
                            edge_id: edge.id.clone(),
                            mappings: edge.mappings.clone(),
                        },
                    );
                }
                (None, _) => {
                    errors.push(
                        CompileError::parse(
                            "P002",
                            format!(
                                "Edge '{}' references unknown source node '{}'",
                                edge.id, edge.source
                            ),
                        )
                        .with_node(&edge.source),
                    );
                }
                (_, None) => {
                    errors.push(
                        CompileError::parse(
                            "P002",
                            format!(
                                "Edge '{}' references unknown target node '{}'",
                                edge.id, edge.target
                            ),
                        )
                        .with_node(&edge.target),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FlowGraph { graph, node_indices })
    }

    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return 0;
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .count()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return 0;
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .count()
    }
}
