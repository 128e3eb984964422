//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::cwl::job;
use crate::error::CompileError;
use crate::registry::ToolRegistry;
use crate::types::compat::ConnectionCheck;

/// Full pipeline: parse → flatten → sort → assemble.
/// Returns a JSON object with either the rendered documents (success)
/// or `errors` (failure).
#[wasm_bindgen]
pub fn compile_graph(graph_json: &str, descriptors_json: &str, annotations_json: &str) -> JsValue {
    let result = compile_graph_inner(graph_json, descriptors_json, annotations_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn compile_graph_inner(
    graph_json: &str,
    descriptors_json: &str,
    annotations_json: &str,
) -> CompileResult {
    let registry = match ToolRegistry::from_json(descriptors_json, annotations_json) {
        Ok(r) => r,
        Err(e) => {
            return CompileResult::Errors {
                errors: vec![ErrorDto {
                    code: "P001".into(),
                    phase: "Parse".into(),
                    message: e.to_string(),
                    node_id: None,
                }],
            };
        }
    };

    let graph = match crate::parse::parse(graph_json) {
        Ok(g) => g,
        Err(errors) => return CompileResult::from_errors(errors),
    };

    let output = match crate::lower::compile(&graph, &registry) {
        Ok(o) => o,
        Err(errors) => return CompileResult::from_errors(errors),
    };

    let workflow = match output.workflow.to_yaml() {
        Ok(y) => y,
        Err(e) => {
            return CompileResult::Errors {
                errors: vec![ErrorDto {
                    code: "A001".into(),
                    phase: "Assemble".into(),
                    message: format!("Failed to render workflow YAML: {}", e),
                    node_id: None,
                }],
            };
        }
    };
    let job = match job::job_template_yaml(&output.workflow, &output.job_defaults) {
        Ok(y) => y,
        Err(e) => {
            return CompileResult::Errors {
                errors: vec![ErrorDto {
                    code: "A001".into(),
                    phase: "Assemble".into(),
                    message: format!("Failed to render job YAML: {}", e),
                    node_id: None,
                }],
            };
        }
    };

    CompileResult::Success { workflow, job }
}

/// Connection feasibility check for the editor while a wire is being
/// dragged. Extension arrays are JSON (`null` or `["nii","nii.gz"]`).
#[wasm_bindgen]
pub fn check_connection(
    output_type: &str,
    input_type: &str,
    output_exts_json: &str,
    input_exts_json: &str,
) -> JsValue {
    let result = check_connection_inner(output_type, input_type, output_exts_json, input_exts_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn check_connection_inner(
    output_type: &str,
    input_type: &str,
    output_exts_json: &str,
    input_exts_json: &str,
) -> ConnectionCheck {
    let output_exts = parse_exts(output_exts_json);
    let input_exts = parse_exts(input_exts_json);
    crate::types::compat::check_connection(
        output_type,
        input_type,
        output_exts.as_deref(),
        input_exts.as_deref(),
    )
}

fn parse_exts(json: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Option<Vec<String>>>(json).unwrap_or(None)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<CompileError> for ErrorDto {
    fn from(e: CompileError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum CompileResult {
    Success { workflow: String, job: String },
    Errors { errors: Vec<ErrorDto> },
}

impl CompileResult {
    fn from_errors(errors: Vec<CompileError>) -> Self {
        CompileResult::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        }
    }
}
