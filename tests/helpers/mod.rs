//! Shared builders for compiler integration tests: graphs, edges, and a
//! hand-built tool set so tests never depend on descriptor parsing.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use cwlflow::parse::types::{Edge, EdgeMapping, Graph, Node};
use cwlflow::registry::{InputSpec, OutputSpec, ToolConfig, ToolLookup};

// =============================================================================
// Graph builders
// =============================================================================

pub fn node(id: &str, tool_name: &str) -> Node {
    Node::new(id, tool_name)
}

pub fn scatter_node(id: &str, tool_name: &str) -> Node {
    let mut n = Node::new(id, tool_name);
    n.is_scatter_source = true;
    n
}

/// Edge carrying a single output->input binding.
pub fn edge(id: &str, source: &str, target: &str, output: &str, input: &str) -> Edge {
    Edge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        mappings: vec![EdgeMapping {
            source_output: output.to_string(),
            target_input: input.to_string(),
        }],
    }
}

pub fn edge_multi(id: &str, source: &str, target: &str, bindings: &[(&str, &str)]) -> Edge {
    Edge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        mappings: bindings
            .iter()
            .map(|(output, input)| EdgeMapping {
                source_output: output.to_string(),
                target_input: input.to_string(),
            })
            .collect(),
    }
}

pub fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Graph {
    Graph { nodes, edges }
}

/// A nested-workflow node wrapping the given internal graph.
pub fn nested_node(id: &str, sub_workflow_id: &str, nodes: Vec<Node>, edges: Vec<Edge>) -> Node {
    let mut n = Node::new(id, "nested");
    n.sub_workflow_id = Some(sub_workflow_id.to_string());
    n.internal_nodes = nodes;
    n.internal_edges = edges;
    n
}

// =============================================================================
// Tool set
// =============================================================================

fn input(ty: &str, label: &str) -> InputSpec {
    InputSpec {
        ty: ty.to_string(),
        label: label.to_string(),
        flag: None,
        bounds: None,
        options: None,
        accepted_extensions: None,
    }
}

fn output(ty: &str, label: &str, glob: &str) -> OutputSpec {
    OutputSpec {
        ty: ty.to_string(),
        label: label.to_string(),
        glob: glob.to_string(),
        extensions: None,
    }
}

/// Fixed in-memory tool set modelled on a small neuroimaging stack.
pub struct ToolSet {
    tools: HashMap<String, Rc<ToolConfig>>,
}

impl ToolSet {
    pub fn new() -> Self {
        let mut tools = HashMap::new();

        // Brain extraction: one File in, one File out, one tunable knob.
        let mut required = IndexMap::new();
        required.insert("in_file".to_string(), input("File", "Input image"));
        let mut optional = IndexMap::new();
        optional.insert(
            "fractional_intensity".to_string(),
            InputSpec {
                ty: "float".to_string(),
                label: "Fractional intensity threshold".to_string(),
                flag: Some("-f".to_string()),
                bounds: Some((0.0, 1.0)),
                options: None,
                accepted_extensions: None,
            },
        );
        let mut outputs = IndexMap::new();
        outputs.insert(
            "out_file".to_string(),
            output("File", "Brain-extracted image", "*_brain.nii.gz"),
        );
        tools.insert(
            "fsl_bet".to_string(),
            Rc::new(ToolConfig {
                id: "fsl_bet".to_string(),
                label: "BET".to_string(),
                required_inputs: required,
                optional_inputs: optional,
                outputs,
                execution_image: Some("vnmd/fsl:6.0.4".to_string()),
            }),
        );

        // Tissue segmentation: File in, File out, no options.
        let mut required = IndexMap::new();
        required.insert("in_file".to_string(), input("File", "Input image"));
        let mut outputs = IndexMap::new();
        outputs.insert(
            "segmentation".to_string(),
            output("File", "Segmentation map", "*_seg.nii.gz"),
        );
        tools.insert(
            "fsl_fast".to_string(),
            Rc::new(ToolConfig {
                id: "fsl_fast".to_string(),
                label: "FAST".to_string(),
                required_inputs: required,
                optional_inputs: IndexMap::new(),
                outputs,
                execution_image: None,
            }),
        );

        // Merge: collects many files into one, the natural multi-source
        // target.
        let mut required = IndexMap::new();
        required.insert("in_files".to_string(), input("File[]", "Images to merge"));
        let mut outputs = IndexMap::new();
        outputs.insert(
            "merged".to_string(),
            output("File", "Merged image", "merged.nii.gz"),
        );
        tools.insert(
            "fsl_merge".to_string(),
            Rc::new(ToolConfig {
                id: "fsl_merge".to_string(),
                label: "Merge".to_string(),
                required_inputs: required,
                optional_inputs: IndexMap::new(),
                outputs,
                execution_image: None,
            }),
        );

        // QC report: File in, File out, nothing tunable.
        let mut required = IndexMap::new();
        required.insert("in_file".to_string(), input("File", "Input image"));
        let mut outputs = IndexMap::new();
        outputs.insert(
            "report".to_string(),
            output("File", "Quality report", "report.html"),
        );
        tools.insert(
            "quality_report".to_string(),
            Rc::new(ToolConfig {
                id: "quality_report".to_string(),
                label: "Quality report".to_string(),
                required_inputs: required,
                optional_inputs: IndexMap::new(),
                outputs,
                execution_image: None,
            }),
        );

        ToolSet { tools }
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        ToolSet::new()
    }
}

impl ToolLookup for ToolSet {
    fn lookup(&self, tool_name: &str) -> Option<Rc<ToolConfig>> {
        self.tools.get(tool_name).map(Rc::clone)
    }
}
