//! Companion parameter file generation.
//!
//! One entry per declared workflow input, in declaration order: the
//! compiled default if one exists, else the input's own declared default,
//! else a placeholder derived from the type. Shape-compatible with what
//! an external generate-template-from-schema tool produces.

use indexmap::IndexMap;
use serde_json::{Value, json};

use super::types::{JobDefaults, WorkflowDoc};
use crate::types::normalize::{TypeShape, parse_short};

pub fn job_template(doc: &WorkflowDoc, defaults: &JobDefaults) -> IndexMap<String, Value> {
    let mut template = IndexMap::new();
    for (name, input) in &doc.inputs {
        let value = defaults
            .get(name)
            .cloned()
            .or_else(|| input.default.clone())
            .unwrap_or_else(|| placeholder(&input.ty, name));
        template.insert(name.clone(), value);
    }
    template
}

pub fn job_template_yaml(
    doc: &WorkflowDoc,
    defaults: &JobDefaults,
) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&job_template(doc, defaults))
}

fn placeholder(ty: &str, name: &str) -> Value {
    let nt = parse_short(ty);
    if nt.nullable {
        return Value::Null;
    }
    match &nt.shape {
        TypeShape::Primitive(base) => scalar_placeholder(base, name),
        TypeShape::Array(item) => json!([scalar_placeholder(item, name)]),
        _ => Value::Null,
    }
}

fn scalar_placeholder(base: &str, name: &str) -> Value {
    match base {
        "File" => json!({"class": "File", "path": format!("path/to/{}", name)}),
        "Directory" => json!({"class": "Directory", "path": format!("path/to/{}", name)}),
        "string" => json!(""),
        "int" | "long" => json!(0),
        "float" | "double" => json!(0.0),
        "boolean" => json!(false),
        _ => Value::Null,
    }
}
