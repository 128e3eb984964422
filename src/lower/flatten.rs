//! Nested-workflow expansion.
//!
//! Eliminates nested-workflow nodes so the rest of the pipeline only ever
//! sees a flat graph of primitive tool nodes and dummy nodes. Expansion
//! runs one level at a time to a fixpoint; boundary mappings of shape
//! `<innerId>/<ioName>` split on the first `/` per pass, so arbitrarily
//! deep paths resolve naturally.

use std::collections::{HashMap, HashSet};

use crate::error::CompileError;
use crate::parse::types::{Edge, EdgeMapping, Graph, Node};

pub fn flatten_graph(graph: &Graph) -> Result<Graph, Vec<CompileError>> {
    let mut nodes = graph.nodes.clone();
    let mut edges = graph.edges.clone();
    // Expansion lineage per node id: the subWorkflowIds this node was
    // expanded out of. Guards against a workflow embedding itself.
    let mut lineage: HashMap<String, Vec<String>> = HashMap::new();

    while nodes.iter().any(Node::is_nested) {
        (nodes, edges) = expand_one_level(&nodes, &edges, &mut lineage)?;
    }

    Ok(Graph { nodes, edges })
}

fn expand_one_level(
    nodes: &[Node],
    edges: &[Edge],
    lineage: &mut HashMap<String, Vec<String>>,
) -> Result<(Vec<Node>, Vec<Edge>), Vec<CompileError>> {
    let mut nested_ids: HashSet<&str> = HashSet::new();
    let mut out_nodes = Vec::new();
    let mut out_edges = Vec::new();

    for node in nodes {
        if !node.is_nested() {
            out_nodes.push(node.clone());
            continue;
        }
        nested_ids.insert(node.id.as_str());

        let own_lineage = lineage.get(&node.id).cloned().unwrap_or_default();
        if let Some(wid) = &node.sub_workflow_id {
            if own_lineage.contains(wid) {
                return Err(vec![CompileError::flatten(
                    "F001",
                    format!("Nested workflow '{}' embeds itself", wid),
                    Some(node.id.clone()),
                )]);
            }
        }
        let mut child_lineage = own_lineage;
        if let Some(wid) = &node.sub_workflow_id {
            child_lineage.push(wid.clone());
        }

        for inner in &node.internal_nodes {
            let mut clone = inner.clone();
            clone.id = namespaced(&node.id, &inner.id);
            lineage.insert(clone.id.clone(), child_lineage.clone());
            out_nodes.push(clone);
        }
        for inner in &node.internal_edges {
            let mut clone = inner.clone();
            clone.id = namespaced(&node.id, &inner.id);
            clone.source = namespaced(&node.id, &inner.source);
            clone.target = namespaced(&node.id, &inner.target);
            out_edges.push(clone);
        }
    }

    for edge in edges {
        let src_nested = nested_ids.contains(edge.source.as_str());
        let tgt_nested = nested_ids.contains(edge.target.as_str());
        if !src_nested && !tgt_nested {
            out_edges.push(edge.clone());
            continue;
        }

        // Mappings on a boundary edge may resolve to different inner
        // nodes; fan out into one edge per distinct resolved pair so
        // downstream logic never reasons about one-edge-many-destinations.
        let mut groups: Vec<((String, String), Vec<EdgeMapping>)> = Vec::new();
        for mapping in &edge.mappings {
            let (source, source_output) = if src_nested {
                split_boundary(&edge.source, &mapping.source_output)
            } else {
                (edge.source.clone(), mapping.source_output.clone())
            };
            let (target, target_input) = if tgt_nested {
                split_boundary(&edge.target, &mapping.target_input)
            } else {
                (edge.target.clone(), mapping.target_input.clone())
            };
            let key = (source, target);
            let resolved = EdgeMapping {
                source_output,
                target_input,
            };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, mappings)) => mappings.push(resolved),
                None => groups.push((key, vec![resolved])),
            }
        }

        for (i, ((source, target), mappings)) in groups.into_iter().enumerate() {
            let id = if i == 0 {
                edge.id.clone()
            } else {
                format!("{}_{}", edge.id, i)
            };
            out_edges.push(Edge {
                id,
                source,
                target,
                mappings,
            });
        }
    }

    Ok((out_nodes, out_edges))
}

fn namespaced(outer: &str, inner: &str) -> String {
    format!("{}::{}", outer, inner)
}

/// Split a boundary io key `<innerId>/<ioName>` and redirect to the
/// rewritten inner node. A key without a separator keeps the stale outer
/// endpoint; the graph build reports it as an unknown reference.
fn split_boundary(outer_id: &str, key: &str) -> (String, String) {
    match key.split_once('/') {
        Some((inner, io_name)) => (namespaced(outer_id, inner), io_name.to_string()),
        None => (outer_id.to_string(), key.to_string()),
    }
}
