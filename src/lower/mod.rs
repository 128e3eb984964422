//! Lowering pipeline: flatten -> propagate scatter -> strip visual
//! nodes -> topologically sort -> assemble.
//!
//! Errors are collected per phase; a later phase only runs when the
//! previous one produced a usable graph.

pub mod assemble;
pub mod flatten;
pub mod scatter;
pub mod topo;

use tracing::debug;

use crate::cwl::types::{JobDefaults, WorkflowDoc};
use crate::error::CompileError;
use crate::parse::graph::FlowGraph;
use crate::parse::types::{Edge, Graph, Node};
use crate::registry::ToolLookup;

/// Fully lowered compilation result. The job defaults ship alongside
/// the document as the companion parameter file.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub workflow: WorkflowDoc,
    pub job_defaults: JobDefaults,
}

pub fn compile(graph: &Graph, lookup: &dyn ToolLookup) -> Result<CompileOutput, Vec<CompileError>> {
    let flat = flatten::flatten_graph(graph)?;
    debug!(
        nodes = flat.nodes.len(),
        edges = flat.edges.len(),
        "flattened graph"
    );

    // Scatter propagation runs on the full graph so dummy sources still
    // seed their downstream nodes.
    let full = FlowGraph::build(&flat)?;
    let scatter = scatter::propagate(&flat, &full);
    debug!(scattered = scatter.scattered.len(), "scatter propagated");

    let (nodes, edges) = strip_dummies(&flat);
    let stripped_graph = Graph { nodes, edges };
    let stripped = FlowGraph::build(&stripped_graph)?;

    let order = topo::topo_sort(&stripped)?;
    debug!(steps = order.len(), "topological order fixed");

    // The assembler sees the full flattened graph: dummy-origin edges
    // wire nothing but still drive scatter detection.
    let (workflow, job_defaults) = assemble::assemble(
        &flat.nodes,
        &flat.edges,
        &order,
        &stripped,
        &scatter.scattered,
        &scatter.sources,
        lookup,
    );

    Ok(CompileOutput {
        workflow,
        job_defaults,
    })
}

/// Drop visual-only nodes and every edge touching one. Their targets
/// pick up synthesized workflow inputs during assembly.
fn strip_dummies(graph: &Graph) -> (Vec<Node>, Vec<Edge>) {
    let nodes: Vec<Node> = graph.nodes.iter().filter(|n| !n.is_dummy()).cloned().collect();
    let kept: std::collections::HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges: Vec<Edge> = graph
        .edges
        .iter()
        .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
        .cloned()
        .collect();
    (nodes, edges)
}
