//! Output document model: the DAG-of-steps workflow plus its companion
//! job defaults.
//!
//! Everything here is plain data with insertion-ordered maps, safe to
//! persist, diff, or hash. The compiler allocates these fresh on every
//! compilation; no shared mutable state survives between runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse::types::LinkMerge;

pub const CWL_VERSION: &str = "v1.2";

/// Literal values destined for the companion parameter file, keyed by
/// workflow-input name. Never embedded in the workflow document itself.
pub type JobDefaults = IndexMap<String, Value>;

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDoc {
    pub cwl_version: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub requirements: IndexMap<String, Value>,
    pub inputs: IndexMap<String, WorkflowInput>,
    pub outputs: IndexMap<String, WorkflowOutput>,
    pub steps: IndexMap<String, WorkflowStep>,
}

impl WorkflowDoc {
    pub fn new() -> Self {
        WorkflowDoc {
            cwl_version: CWL_VERSION.to_string(),
            class: "Workflow".to_string(),
            requirements: IndexMap::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            steps: IndexMap::new(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Default for WorkflowDoc {
    fn default() -> Self {
        WorkflowDoc::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutput {
    #[serde(rename = "type")]
    pub ty: String,
    pub output_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_value: Option<String>,
}

// =============================================================================
// STEPS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub run: String,
    #[serde(rename = "in")]
    pub inputs: IndexMap<String, StepInput>,
    pub out: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scatter: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scatter_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<StepHints>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub source: OneOrMany<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_merge: Option<LinkMerge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepHints {
    #[serde(rename = "DockerRequirement")]
    pub docker: DockerRequirement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerRequirement {
    #[serde(rename = "dockerPull")]
    pub docker_pull: String,
}

// =============================================================================
// FEATURE REQUIREMENTS
// =============================================================================

/// Runner feature flags accumulated opportunistically across the node
/// walk, never hand-set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub inline_javascript: bool,
    pub scatter: bool,
    pub multiple_input: bool,
    pub step_input_expression: bool,
}

impl FeatureFlags {
    /// Emit the `requirements` map in a fixed order for determinism.
    pub fn to_requirements(&self) -> IndexMap<String, Value> {
        let mut map = IndexMap::new();
        let empty = || Value::Object(serde_json::Map::new());
        if self.inline_javascript {
            map.insert("InlineJavascriptRequirement".to_string(), empty());
        }
        if self.scatter {
            map.insert("ScatterFeatureRequirement".to_string(), empty());
        }
        if self.multiple_input {
            map.insert("MultipleInputFeatureRequirement".to_string(), empty());
        }
        if self.step_input_expression {
            map.insert("StepInputExpressionRequirement".to_string(), empty());
        }
        map
    }
}
