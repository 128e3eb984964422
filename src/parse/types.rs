//! Rust types mirroring the editor's canvas graph JSON.
//!
//! These types are the serde target for the graph the external canvas
//! produces. Layout data (positions, colors) never reaches the compiler;
//! the editor strips it before handing the graph over.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tool-name marker for visual-only pass-through nodes.
pub const DUMMY_TOOL: &str = "dummy";
/// Tool-name marker for the dataset selector, a dummy producing named
/// array outputs.
pub const DATASET_TOOL: &str = "dataset";

// =============================================================================
// TOP-LEVEL GRAPH
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Key into the tool registry, or one of the marker names above.
    pub tool_name: String,
    #[serde(default)]
    pub is_scatter_source: bool,
    /// Literal values for optional inputs, entered in the parameter dialog.
    #[serde(default)]
    pub parameters: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub docker_tag: Option<String>,
    /// Per-input merge strategy overrides for multi-source inputs.
    #[serde(default)]
    pub link_merge_overrides: IndexMap<String, LinkMerge>,
    /// Guard expression attached verbatim as the step's `when` clause.
    #[serde(default)]
    pub conditional_expression: Option<String>,
    /// Per-input transform expressions attached as `valueFrom`.
    #[serde(default)]
    pub value_expressions: IndexMap<String, String>,
    /// Self-contained sub-graph; non-empty iff this is a nested-workflow node.
    #[serde(default)]
    pub internal_nodes: Vec<Node>,
    #[serde(default)]
    pub internal_edges: Vec<Edge>,
    /// (first, last) real step of a nested workflow, kept for the editor's
    /// adjacency validation. Not consumed by the compiler.
    #[serde(default)]
    pub boundary_tool_names: Option<(String, String)>,
    /// Identity of the saved workflow a nested node was embedded from.
    /// Drives the self-embedding guard during flattening.
    #[serde(default)]
    pub sub_workflow_id: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            tool_name: tool_name.into(),
            is_scatter_source: false,
            parameters: IndexMap::new(),
            docker_tag: None,
            link_merge_overrides: IndexMap::new(),
            conditional_expression: None,
            value_expressions: IndexMap::new(),
            internal_nodes: Vec::new(),
            internal_edges: Vec::new(),
            boundary_tool_names: None,
            sub_workflow_id: None,
        }
    }

    /// Visual-only nodes participate in layout and scatter propagation but
    /// never become compiled steps.
    pub fn is_dummy(&self) -> bool {
        self.tool_name == DUMMY_TOOL || self.tool_name == DATASET_TOOL
    }

    pub fn is_nested(&self) -> bool {
        !self.internal_nodes.is_empty()
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// An edge may encode zero, one, or many output->input bindings between
/// the same two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub mappings: Vec<EdgeMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMapping {
    pub source_output: String,
    pub target_input: String,
}

// =============================================================================
// LINK MERGE
// =============================================================================

/// Strategy for combining multiple upstream values feeding one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMerge {
    #[serde(rename = "merge_flattened")]
    MergeFlattened,
    #[serde(rename = "merge_nested")]
    MergeNested,
}

impl LinkMerge {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMerge::MergeFlattened => "merge_flattened",
            LinkMerge::MergeNested => "merge_nested",
        }
    }
}
