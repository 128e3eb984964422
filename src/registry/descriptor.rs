//! Raw CommandLineTool descriptors, UI annotations, and the merge that
//! produces a `ToolConfig`.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::types::{InputSpec, OutputSpec, ToolConfig};
use crate::types::normalize::{NormalizedType, TypeShape, normalize};

// =============================================================================
// RAW DESCRIPTOR
// =============================================================================

/// Lenient serde target for a CWL CommandLineTool document. Inputs and
/// outputs come as maps or id-carrying arrays depending on authoring style.
#[derive(Debug, Clone, Deserialize)]
pub struct RawToolDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: RawIoSet,
    #[serde(default)]
    pub outputs: RawIoSet,
    #[serde(default)]
    pub requirements: Value,
    #[serde(default)]
    pub hints: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawIoSet {
    Map(IndexMap<String, RawIo>),
    List(Vec<RawIoNamed>),
}

impl Default for RawIoSet {
    fn default() -> Self {
        RawIoSet::Map(IndexMap::new())
    }
}

impl RawIoSet {
    fn entries(&self) -> Vec<(String, &RawIo)> {
        match self {
            RawIoSet::Map(m) => m.iter().map(|(k, v)| (k.clone(), v)).collect(),
            RawIoSet::List(l) => l.iter().map(|e| (e.id.clone(), &e.io)).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIoNamed {
    pub id: String,
    #[serde(flatten)]
    pub io: RawIo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIo {
    #[serde(rename = "type", default)]
    pub ty: Value,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub input_binding: Option<Value>,
    #[serde(default)]
    pub output_binding: Option<Value>,
}

// =============================================================================
// UI ANNOTATIONS
// =============================================================================

/// Separately maintained editor-side metadata, merged over the raw
/// descriptor. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: IndexMap<String, InputAnnotation>,
    #[serde(default)]
    pub outputs: IndexMap<String, OutputAnnotation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputAnnotation {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub bounds: Option<(f64, f64)>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub accepted_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputAnnotation {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

// =============================================================================
// MERGE
// =============================================================================

/// Merge a raw descriptor value with its annotations into a `ToolConfig`.
/// An uninterpretable descriptor degrades to the generic fallback shape.
pub fn build_config(tool_name: &str, raw: &Value, annotations: Option<&ToolAnnotations>) -> ToolConfig {
    let descriptor: RawToolDescriptor = match serde_json::from_value(raw.clone()) {
        Ok(d) => d,
        Err(e) => {
            warn!(tool = tool_name, error = %e, "uninterpretable tool descriptor, using fallback shape");
            return ToolConfig::fallback(tool_name);
        }
    };

    let empty = ToolAnnotations::default();
    let ann = annotations.unwrap_or(&empty);

    let mut required_inputs = IndexMap::new();
    let mut optional_inputs = IndexMap::new();

    for (name, io) in descriptor.inputs.entries() {
        let nt = normalize(&io.ty);
        let input_ann = ann.inputs.get(&name);
        let spec = input_spec(&name, io, &nt, input_ann);
        if nt.nullable {
            optional_inputs.insert(name, spec);
        } else {
            required_inputs.insert(name, spec);
        }
    }

    let mut outputs = IndexMap::new();
    for (name, io) in descriptor.outputs.entries() {
        let nt = normalize(&io.ty);
        let output_ann = ann.outputs.get(&name);
        outputs.insert(
            name.clone(),
            OutputSpec {
                ty: scalar_short_form(&nt),
                label: output_ann
                    .and_then(|a| a.label.clone())
                    .or_else(|| io.label.clone())
                    .unwrap_or_else(|| name.clone()),
                glob: glob_of(io),
                extensions: output_ann.and_then(|a| a.extensions.clone()),
            },
        );
    }

    ToolConfig {
        id: descriptor.id.unwrap_or_else(|| tool_name.to_string()),
        label: ann
            .label
            .clone()
            .or(descriptor.label)
            .unwrap_or_else(|| tool_name.to_string()),
        required_inputs,
        optional_inputs,
        outputs,
        execution_image: docker_pull(&descriptor.requirements)
            .or_else(|| docker_pull(&descriptor.hints)),
    }
}

fn input_spec(name: &str, io: &RawIo, nt: &NormalizedType, ann: Option<&InputAnnotation>) -> InputSpec {
    let options = ann.and_then(|a| a.options.clone()).or_else(|| match &nt.shape {
        TypeShape::Enum(symbols) => Some(symbols.clone()),
        _ => None,
    });

    InputSpec {
        ty: scalar_short_form(nt),
        label: ann
            .and_then(|a| a.label.clone())
            .or_else(|| io.label.clone())
            .unwrap_or_else(|| name.to_string()),
        flag: ann.and_then(|a| a.flag.clone()).or_else(|| prefix_of(io)),
        bounds: ann.and_then(|a| a.bounds),
        options,
        accepted_extensions: ann.and_then(|a| a.accepted_extensions.clone()),
    }
}

/// Short form with nullability stripped; the required/optional split
/// carries it instead. Enums surface as constrained strings, records as
/// the `record` marker.
fn scalar_short_form(nt: &NormalizedType) -> String {
    match &nt.shape {
        TypeShape::Record(_) => "record".to_string(),
        TypeShape::Enum(_) => "string".to_string(),
        shape => NormalizedType {
            nullable: false,
            shape: shape.clone(),
        }
        .short_form(),
    }
}

fn prefix_of(io: &RawIo) -> Option<String> {
    io.input_binding
        .as_ref()?
        .get("prefix")?
        .as_str()
        .map(String::from)
}

fn glob_of(io: &RawIo) -> String {
    let glob = io
        .output_binding
        .as_ref()
        .and_then(|b| b.get("glob"));
    match glob {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(a)) => a
            .first()
            .and_then(Value::as_str)
            .unwrap_or("*")
            .to_string(),
        _ => "*".to_string(),
    }
}

/// Scan a requirements/hints listing (array or map form) for a
/// DockerRequirement's dockerPull.
fn docker_pull(listing: &Value) -> Option<String> {
    match listing {
        Value::Array(items) => items.iter().find_map(|item| {
            let obj = item.as_object()?;
            if obj.get("class").and_then(Value::as_str) == Some("DockerRequirement") {
                obj.get("dockerPull")?.as_str().map(String::from)
            } else {
                None
            }
        }),
        Value::Object(map) => map
            .get("DockerRequirement")?
            .get("dockerPull")?
            .as_str()
            .map(String::from),
        _ => None,
    }
}
