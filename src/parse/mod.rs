//! Parse phase: JSON → Rust types + graph construction.

pub mod graph;
pub mod types;

pub use graph::FlowGraph;
pub use types::*;

use crate::error::CompileError;

/// Deserialize a canvas graph JSON string into a `Graph`.
pub fn parse(json: &str) -> Result<Graph, Vec<CompileError>> {
    serde_json::from_str::<Graph>(json).map_err(|e| {
        vec![CompileError::parse(
            "P001",
            format!("Failed to parse graph JSON: {}", e),
        )]
    })
}

/// Parse JSON and build the graph in one step.
pub fn parse_and_build(json: &str) -> Result<(Graph, FlowGraph), Vec<CompileError>> {
    let graph = parse(json)?;
    let flow = FlowGraph::build(&graph)?;
    Ok((graph, flow))
}
