//! The workflow assembler: walks nodes in topological order and builds
//! the output document plus its companion job defaults.
//!
//! Each input resolves to either an upstream step reference or a fresh
//! workflow-level input; scatter wraps file-like types; per-node
//! execution hints, guards, and transform expressions attach to the step.
//! Feature-requirement flags accumulate across the whole walk and are
//! emitted once.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::warn;

use crate::cwl::types::{
    DockerRequirement, FeatureFlags, JobDefaults, OneOrMany, StepHints, StepInput, WorkflowDoc,
    WorkflowInput, WorkflowOutput, WorkflowStep,
};
use crate::parse::graph::FlowGraph;
use crate::parse::types::{Edge, LinkMerge, Node};
use crate::registry::{InputSpec, ToolConfig, ToolLookup};
use crate::types::normalize::{array_wrap, is_file_like, nullable_wrap};

/// One upstream binding feeding an input. `origin` may be a dummy node,
/// in which case the binding wires nothing but still counts for
/// scatter-origin tests.
struct Wired {
    origin: String,
    source_output: String,
}

pub fn assemble(
    nodes: &[Node],
    edges: &[Edge],
    order: &[String],
    stripped: &FlowGraph,
    scattered: &HashSet<String>,
    sources: &HashSet<String>,
    lookup: &dyn ToolLookup,
) -> (WorkflowDoc, JobDefaults) {
    let node_map: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let dummies: HashSet<&str> = nodes
        .iter()
        .filter(|n| n.is_dummy())
        .map(|n| n.id.as_str())
        .collect();

    let step_ids = assign_step_ids(order, &node_map);
    let wired = collect_wiring(edges);

    let mut doc = WorkflowDoc::new();
    let mut defaults = JobDefaults::new();
    let mut flags = FeatureFlags::default();
    let mut tools: HashMap<String, Rc<ToolConfig>> = HashMap::new();

    let single_node_graph = order.len() == 1;

    for node_id in order {
        let node = node_map[node_id.as_str()];
        let tool = lookup.lookup(&node.tool_name).unwrap_or_else(|| {
            warn!(tool = %node.tool_name, node = %node.id, "unknown tool, using generic fallback shape");
            Rc::new(ToolConfig::fallback(&node.tool_name))
        });
        tools.insert(node_id.clone(), Rc::clone(&tool));

        let step_id = &step_ids[node_id];
        let node_wired = wired.get(node_id.as_str());
        let node_scattered = scattered.contains(node_id);

        let mut ins: IndexMap<String, StepInput> = IndexMap::new();

        for (name, spec) in &tool.required_inputs {
            resolve_input(
                ResolveCtx {
                    node,
                    step_id,
                    spec,
                    name,
                    required: true,
                    node_scattered,
                    single_node_graph,
                    dummies: &dummies,
                    step_ids: &step_ids,
                },
                node_wired,
                &mut ins,
                &mut doc,
                &mut defaults,
                &mut flags,
            );
        }
        for (name, spec) in &tool.optional_inputs {
            resolve_input(
                ResolveCtx {
                    node,
                    step_id,
                    spec,
                    name,
                    required: false,
                    node_scattered,
                    single_node_graph,
                    dummies: &dummies,
                    step_ids: &step_ids,
                },
                node_wired,
                &mut ins,
                &mut doc,
                &mut defaults,
                &mut flags,
            );
        }

        let scatter_inputs = scatter_inputs_for(
            &tool,
            node_wired,
            &ins,
            node_scattered,
            sources.contains(node_id),
            scattered,
        );
        let (scatter, scatter_method) = match scatter_inputs.len() {
            0 => (None, None),
            1 => {
                flags.scatter = true;
                (Some(OneOrMany::One(scatter_inputs[0].clone())), None)
            }
            _ => {
                flags.scatter = true;
                (
                    Some(OneOrMany::Many(scatter_inputs)),
                    Some("dotproduct".to_string()),
                )
            }
        };

        let when = node.conditional_expression.clone();
        if when.is_some() {
            flags.inline_javascript = true;
        }

        let hints = tool.execution_image.as_ref().map(|image| StepHints {
            docker: DockerRequirement {
                docker_pull: pull_ref(image, node.docker_tag.as_deref()),
            },
        });

        doc.steps.insert(
            step_id.clone(),
            WorkflowStep {
                run: format!("tools/{}.cwl", node.tool_name),
                inputs: ins,
                out: tool.outputs.keys().cloned().collect(),
                scatter,
                scatter_method,
                when,
                hints,
            },
        );
    }

    collect_outputs(order, stripped, &node_map, &tools, &step_ids, scattered, &mut doc);
    doc.requirements = flags.to_requirements();

    (doc, defaults)
}

// =============================================================================
// STEP IDS
// =============================================================================

/// Readable step ids: slugified tool name, `_N` suffix only when the same
/// tool appears more than once, N assigned in first-seen topological order.
fn assign_step_ids(order: &[String], node_map: &HashMap<&str, &Node>) -> HashMap<String, String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for node_id in order {
        let slug = slugify(&node_map[node_id.as_str()].tool_name);
        *counts.entry(slug).or_insert(0) += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut ids = HashMap::new();
    for node_id in order {
        let slug = slugify(&node_map[node_id.as_str()].tool_name);
        let step_id = if counts[&slug] > 1 {
            let n = seen.entry(slug.clone()).or_insert(0);
            *n += 1;
            format!("{}_{}", slug, n)
        } else {
            slug
        };
        ids.insert(node_id.clone(), step_id);
    }
    ids
}

fn slugify(tool_name: &str) -> String {
    let mut slug: String = tool_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    while slug.contains("__") {
        slug = slug.replace("__", "_");
    }
    slug.trim_matches('_').to_string()
}

// =============================================================================
// INPUT RESOLUTION
// =============================================================================

fn collect_wiring(edges: &[Edge]) -> HashMap<&str, IndexMap<String, Vec<Wired>>> {
    let mut wired: HashMap<&str, IndexMap<String, Vec<Wired>>> = HashMap::new();
    for edge in edges {
        for mapping in &edge.mappings {
            wired
                .entry(edge.target.as_str())
                .or_default()
                .entry(mapping.target_input.clone())
                .or_default()
                .push(Wired {
                    origin: edge.source.clone(),
                    source_output: mapping.source_output.clone(),
                });
        }
    }
    wired
}

struct ResolveCtx<'a> {
    node: &'a Node,
    step_id: &'a str,
    spec: &'a InputSpec,
    name: &'a str,
    required: bool,
    node_scattered: bool,
    single_node_graph: bool,
    dummies: &'a HashSet<&'a str>,
    step_ids: &'a HashMap<String, String>,
}

fn resolve_input(
    ctx: ResolveCtx<'_>,
    node_wired: Option<&IndexMap<String, Vec<Wired>>>,
    ins: &mut IndexMap<String, StepInput>,
    doc: &mut WorkflowDoc,
    defaults: &mut JobDefaults,
    flags: &mut FeatureFlags,
) {
    let bindings: &[Wired] = node_wired
        .and_then(|m| m.get(ctx.name))
        .map_or(&[], Vec::as_slice);

    // Dummy origins wire nothing; their targets fall through to a
    // synthesized workflow input.
    let step_refs: Vec<String> = bindings
        .iter()
        .filter(|w| !ctx.dummies.contains(w.origin.as_str()))
        .map(|w| format!("{}/{}", ctx.step_ids[&w.origin], w.source_output))
        .collect();

    let value_from = ctx.node.value_expressions.get(ctx.name).cloned();
    if value_from.is_some() {
        flags.step_input_expression = true;
    }

    if !step_refs.is_empty() {
        let (source, link_merge) = if step_refs.len() == 1 {
            (OneOrMany::One(step_refs.into_iter().next().unwrap()), None)
        } else {
            flags.multiple_input = true;
            let merge = ctx
                .node
                .link_merge_overrides
                .get(ctx.name)
                .copied()
                .unwrap_or(LinkMerge::MergeFlattened);
            (OneOrMany::Many(step_refs), Some(merge))
        };
        ins.insert(
            ctx.name.to_string(),
            StepInput {
                source,
                link_merge,
                value_from,
            },
        );
        return;
    }

    let input_name = if ctx.single_node_graph {
        ctx.name.to_string()
    } else {
        format!("{}_{}", ctx.step_id, ctx.name)
    };

    if ctx.required {
        let mut ty = ctx.spec.ty.clone();
        if ctx.node_scattered && is_file_like(&ty) {
            ty = array_wrap(&ty);
        }
        doc.inputs.insert(
            input_name.clone(),
            WorkflowInput {
                ty,
                label: Some(ctx.spec.label.clone()),
                default: None,
            },
        );
    } else {
        // Record inputs are tool-defined, so the workflow exposes them
        // unconstrained.
        let ty = if ctx.spec.ty == "record" {
            "Any?".to_string()
        } else {
            nullable_wrap(&ctx.spec.ty)
        };
        doc.inputs.insert(
            input_name.clone(),
            WorkflowInput {
                ty,
                label: Some(ctx.spec.label.clone()),
                default: None,
            },
        );
        defaults.insert(input_name.clone(), optional_default(ctx.node, ctx.name, ctx.spec));
    }

    ins.insert(
        ctx.name.to_string(),
        StepInput {
            source: OneOrMany::One(input_name),
            link_merge: None,
            value_from,
        },
    );
}

/// User literal if it is plain serializable data, else the
/// type-appropriate zero value.
fn optional_default(node: &Node, name: &str, spec: &InputSpec) -> Value {
    match node.parameters.get(name) {
        Some(v) if is_plain_data(v) => v.clone(),
        Some(_) => {
            warn!(node = %node.id, input = name, "non-serializable parameter value ignored");
            zero_value(spec)
        }
        None => zero_value(spec),
    }
}

fn is_plain_data(value: &Value) -> bool {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
        Value::Array(items) => items.iter().all(is_plain_data),
        Value::Object(map) => map.values().all(is_plain_data),
        Value::Null => false,
    }
}

fn zero_value(spec: &InputSpec) -> Value {
    match spec.ty.as_str() {
        "boolean" => json!(false),
        "int" | "long" => json!(spec.bounds.map(|(lo, _)| lo as i64).unwrap_or(0)),
        "float" | "double" => json!(spec.bounds.map(|(lo, _)| lo).unwrap_or(0.0)),
        "string" => json!(""),
        _ => Value::Null,
    }
}

// =============================================================================
// SCATTER WIRING
// =============================================================================

fn scatter_inputs_for(
    tool: &ToolConfig,
    node_wired: Option<&IndexMap<String, Vec<Wired>>>,
    ins: &IndexMap<String, StepInput>,
    node_scattered: bool,
    is_source: bool,
    scattered: &HashSet<String>,
) -> Vec<String> {
    if !node_scattered {
        return Vec::new();
    }

    if is_source {
        // A source scatters over every file-like required input not
        // already wired from upstream.
        tool.required_inputs
            .iter()
            .filter(|(name, spec)| {
                let wired_at_all = node_wired
                    .and_then(|m| m.get(*name))
                    .is_some_and(|v| !v.is_empty());
                is_file_like(&spec.ty) && !wired_at_all
            })
            .map(|(name, _)| name.clone())
            .collect()
    } else {
        // A downstream node scatters over every input wired from a
        // scattered origin, dummy origins included.
        ins.keys()
            .filter(|name| {
                node_wired
                    .and_then(|m| m.get(*name))
                    .is_some_and(|v| v.iter().any(|w| scattered.contains(&w.origin)))
            })
            .cloned()
            .collect()
    }
}

// =============================================================================
// EXECUTION HINTS
// =============================================================================

/// A per-node tag replaces any tag baked into the descriptor image.
fn pull_ref(image: &str, tag: Option<&str>) -> String {
    match tag {
        Some(tag) => {
            let base = image.rsplit_once(':').map(|(b, _)| b).unwrap_or(image);
            format!("{}:{}", base, tag)
        }
        None => image.to_string(),
    }
}

// =============================================================================
// WORKFLOW OUTPUTS
// =============================================================================

/// Every declared output of every terminal node becomes a workflow-level
/// output. A scattered terminal collects arrays; a guarded terminal may
/// be skipped entirely, so its outputs go nullable with a
/// first-non-null pick policy.
fn collect_outputs(
    order: &[String],
    stripped: &FlowGraph,
    node_map: &HashMap<&str, &Node>,
    tools: &HashMap<String, Rc<ToolConfig>>,
    step_ids: &HashMap<String, String>,
    scattered: &HashSet<String>,
    doc: &mut WorkflowDoc,
) {
    let terminals: Vec<&String> = order
        .iter()
        .filter(|id| stripped.outgoing_count(id) == 0)
        .collect();
    let single_terminal = terminals.len() == 1;

    for node_id in terminals {
        let node = node_map[node_id.as_str()];
        let tool = &tools[node_id];
        let step_id = &step_ids[node_id];

        for (out_name, out_spec) in &tool.outputs {
            let name = if single_terminal {
                out_name.clone()
            } else {
                format!("{}_{}", step_id, out_name)
            };
            let mut ty = out_spec.ty.clone();
            if scattered.contains(node_id) {
                ty = array_wrap(&ty);
            }
            let mut pick_value = None;
            if node.conditional_expression.is_some() {
                ty = nullable_wrap(&ty);
                pick_value = Some("first_non_null".to_string());
            }
            doc.outputs.insert(
                name,
                WorkflowOutput {
                    ty,
                    output_source: format!("{}/{}", step_id, out_name),
                    pick_value,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_tool_names() {
        assert_eq!(slugify("FSL BET"), "fsl_bet");
        assert_eq!(slugify("ants/Registration"), "ants_registration");
        assert_eq!(slugify("--weird--"), "weird");
    }

    #[test]
    fn plain_data_rejects_null() {
        assert!(is_plain_data(&json!("x")));
        assert!(is_plain_data(&json!([1, 2, {"a": true}])));
        assert!(!is_plain_data(&Value::Null));
        assert!(!is_plain_data(&json!({"handle": null})));
    }

    #[test]
    fn pull_ref_replaces_tag() {
        assert_eq!(pull_ref("lab/fsl", Some("6.0")), "lab/fsl:6.0");
        assert_eq!(pull_ref("lab/fsl:5.0", Some("6.0")), "lab/fsl:6.0");
        assert_eq!(pull_ref("lab/fsl:5.0", None), "lab/fsl:5.0");
    }
}
