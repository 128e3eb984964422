//! The queryable per-tool configuration consumed by the assembler.

use indexmap::IndexMap;

/// A tool's merged configuration: raw descriptor + UI annotations.
/// Built once per distinct tool name on first lookup and cached for the
/// session; invalidated only when the descriptor set is reloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub id: String,
    pub label: String,
    /// name -> spec, in descriptor order. Required = non-nullable type.
    pub required_inputs: IndexMap<String, InputSpec>,
    pub optional_inputs: IndexMap<String, InputSpec>,
    pub outputs: IndexMap<String, OutputSpec>,
    /// Container image from the descriptor's DockerRequirement.
    pub execution_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Scalar short form (`File`, `int`, `string[]`) with nullability
    /// stripped, or the `record` marker for tool-defined record groups.
    pub ty: String,
    pub label: String,
    /// Command-line flag, shown in the parameter dialog.
    pub flag: Option<String>,
    /// (lower, upper) bounds for numeric inputs.
    pub bounds: Option<(f64, f64)>,
    /// Enum symbols or annotated choices.
    pub options: Option<Vec<String>>,
    pub accepted_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub ty: String,
    pub label: String,
    pub glob: String,
    pub extensions: Option<Vec<String>>,
}

impl ToolConfig {
    /// The generic single-File-input/single-File-output shape substituted
    /// for unknown tools and uninterpretable descriptors.
    pub fn fallback(tool_name: &str) -> Self {
        let mut required_inputs = IndexMap::new();
        required_inputs.insert(
            "input".to_string(),
            InputSpec {
                ty: "File".to_string(),
                label: "Input file".to_string(),
                flag: None,
                bounds: None,
                options: None,
                accepted_extensions: None,
            },
        );
        let mut outputs = IndexMap::new();
        outputs.insert(
            "output".to_string(),
            OutputSpec {
                ty: "File".to_string(),
                label: "Output file".to_string(),
                glob: "*".to_string(),
                extensions: None,
            },
        );
        ToolConfig {
            id: tool_name.to_string(),
            label: tool_name.to_string(),
            required_inputs,
            optional_inputs: IndexMap::new(),
            outputs,
            execution_image: None,
        }
    }
}
