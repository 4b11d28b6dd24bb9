//! Snapshot tests for the diagnostic dumps

#[path = "../common/mod.rs"]
mod common;

use andersen_pta::application::dump;
use andersen_pta::config::SolverConfig;
use andersen_pta::domain::SpecialKind;
use common::*;
use pretty_assertions::assert_eq;

fn sample() -> Program {
    let mut b = ProgramBuilder::new();
    let p = b.value();
    let q = b.value();
    let r = b.value();
    let s = b.object_with_fields(2);
    let t = b.object();
    let null = b.special(SpecialKind::Null);
    b.addr_of(p, s)
        .addr_of(q, t)
        .addr_of(r, null)
        .store(p, q, 1)
        .load(r, p, 1)
        .copy(q, r);
    b.build()
}

#[test]
fn test_plain_constraint_snapshot() {
    let program = sample();
    let expected = "\
0 0 3 0
0 1 5 0
0 2 6 0
3 0 1 1
2 2 0 1
1 1 2 0
";
    assert_eq!(dump::constraints_plain(&program.constraints), expected);
}

#[test]
fn test_plain_dump_parses_back() {
    let program = sample();
    let text = dump::constraints_plain(&program.constraints);
    assert_eq!(parse_constraints(&text).unwrap(), program.constraints);
}

#[test]
fn test_parse_errors() {
    assert!(parse_constraints("0 1 2").is_err());
    assert!(parse_constraints("7 0 0 0").is_err());
    assert!(parse_constraints("0 a 1 0").is_err());
    assert!(parse_constraints("# only a comment\n\n").unwrap().is_empty());
}

#[test]
fn test_pretty_constraint_snapshot() {
    let program = sample();
    let factory = program.factory();
    let expected = "\
----- Constraints -----
v0 = &o3
v1 = &o5
v2 = &null
*(v0 + 1) = v1
v2 = *(v0 + 1)
v1 = v2
----- End of Print -----
";
    assert_eq!(dump::constraints_pretty(factory.nodes(), &program.constraints), expected);
}

#[test]
fn test_points_to_snapshot() {
    let program = sample();
    let result = program.solve(SolverConfig::default().optimize(false));

    // q, o4 and r form a copy cycle: q -> o4 (store), o4 -> r (load), r -> q
    let expected = "\
0 3
1 5 6
2 5 6
4 5 6
";
    assert_eq!(dump::points_to_plain(&result.graph), expected);
}

#[test]
fn test_node_info_snapshot() {
    let program = sample();
    let result = program.solve(SolverConfig::default().optimize(false));
    let rep = result.graph.representative_of(1);
    assert_eq!(rep, result.graph.representative_of(2));
    assert_eq!(rep, result.graph.representative_of(4));

    let expected = format!(
        "\
0 v0 value rep 0
1 v1 value rep {rep}
2 v2 value rep {rep}
3 o3 object base 3 offset 0 of 2 rep 3
4 o4 object base 3 offset 1 of 2 rep {rep}
5 o5 object base 5 offset 0 of 1 rep 5
6 null special null rep 6
"
    );
    assert_eq!(dump::node_info(&result.graph), expected);
}

#[test]
fn test_graph_json_lists_sets() {
    let program = sample();
    let result = program.solve(SolverConfig::default().optimize(false));
    let json: serde_json::Value = serde_json::from_str(&result.graph.to_json().unwrap()).unwrap();
    assert!(json.is_object());
}

#[test]
fn test_debug_dump_matches_plain_dumps() {
    let program = sample();
    let result = program.solve(SolverConfig::default().dump_debug(true));
    let captured = result.debug_dump.as_ref().unwrap();

    assert_eq!(captured.constraints, dump::constraints_plain(&program.constraints));
    assert_eq!(captured.points_to, dump::points_to_plain(&result.graph));
    assert_eq!(parse_constraints(&captured.constraints).unwrap(), program.constraints);

    let quiet = program.solve(SolverConfig::default());
    assert!(quiet.debug_dump.is_none());
}
