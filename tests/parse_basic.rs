//! Integration tests for the parse phase: canvas JSON parsing,
//! round-trips, graph construction.

use cwlflow::parse;

#[test]
fn parse_example_graph() {
    let json = include_str!("fixtures/example_graph.json");
    let graph = parse::parse(json).expect("Should parse successfully");
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);
    assert!(graph.nodes[0].is_dummy());
    assert!(graph.nodes[0].is_scatter_source);
    assert_eq!(graph.nodes[1].tool_name, "fsl_bet");
    assert_eq!(graph.nodes[1].docker_tag.as_deref(), Some("6.0.5"));
    assert_eq!(graph.edges[1].mappings[0].source_output, "out_file");
}

#[test]
fn parse_round_trip() {
    let json = include_str!("fixtures/example_graph.json");
    let graph = parse::parse(json).expect("Should parse");
    let serialized = serde_json::to_string(&graph).expect("Should serialize");
    let graph2 = parse::parse(&serialized).expect("Should parse again");
    assert_eq!(graph.nodes.len(), graph2.nodes.len());
    assert_eq!(graph.edges.len(), graph2.edges.len());
    assert_eq!(graph2.nodes[1].parameters["fractional_intensity"], 0.4);
}

#[test]
fn parse_invalid_json_returns_error() {
    let result = parse::parse("not valid json");
    let errors = result.unwrap_err();
    assert_eq!(errors[0].code, "P001");
}

#[test]
fn parse_and_build_succeeds_on_fixture() {
    let json = include_str!("fixtures/example_graph.json");
    let (graph, flow) = parse::parse_and_build(json).expect("Should parse and build");
    assert_eq!(flow.incoming_count(&graph.nodes[1].id), 1);
    assert_eq!(flow.successors("n_bet"), ["n_fast"]);
    // The built graph is debug-printable for diagnostics.
    assert!(format!("{:?}", flow).contains("n_bet"));
}

#[test]
fn build_rejects_unknown_endpoint() {
    let json = r#"{
        "nodes": [{"id": "a", "toolName": "fsl_bet"}],
        "edges": [{"id": "e1", "source": "a", "target": "ghost",
                   "mappings": [{"sourceOutput": "out_file", "targetInput": "in_file"}]}]
    }"#;
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(errors[0].code, "P002");
    assert_eq!(errors[0].node_id.as_deref(), Some("ghost"));
}
