//! End-to-end scenarios through `AndersenAnalysis`

#[path = "../common/mod.rs"]
mod common;

use andersen_pta::application::AndersenAnalysis;
use andersen_pta::config::{Preset, SolverConfig};
use andersen_pta::domain::{Constraint, SpecialKind};
use andersen_pta::errors::PtaError;
use common::*;

// ═══════════════════════════════════════════════════════════════════════════
// Basic scenarios
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_single_addr_of() {
    let mut b = ProgramBuilder::new();
    let v1 = b.value();
    let o1 = b.object();
    b.addr_of(v1, o1);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, v1, &[o1]);
    assert_points_to_nothing(&result.graph, o1);
}

#[test]
fn test_copy_propagates() {
    let mut b = ProgramBuilder::new();
    let v1 = b.value();
    let v2 = b.value();
    let o1 = b.object();
    b.addr_of(v1, o1).copy(v2, v1);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, v2, &[o1]);
    assert_sound(&result.graph, &program.constraints, true);
}

#[test]
fn test_copy_unions_two_objects() {
    let mut b = ProgramBuilder::new();
    let v1 = b.value();
    let v2 = b.value();
    let o1 = b.object();
    let o2 = b.object();
    b.addr_of(v1, o1).addr_of(v2, o2).copy(v1, v2);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, v1, &[o1, o2]);
    assert_points_to(&result.graph, v2, &[o2]);
}

#[test]
fn test_load_through_pointer_holding_object() {
    let mut b = ProgramBuilder::new();
    let p = b.value();
    let v = b.value();
    let o_p = b.object();
    let o3 = b.object();
    b.addr_of(p, o_p).addr_of(o_p, o3).load(v, p, 0);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, v, &[o3]);
    assert_points_to(&result.graph, o_p, &[o3]);
}

#[test]
fn test_copy_cycle_collapses() {
    let mut b = ProgramBuilder::new();
    let a = b.value();
    let bb = b.value();
    let o1 = b.object();
    b.addr_of(a, o1).copy(bb, a).copy(a, bb);
    let program = b.build();

    for config in [
        SolverConfig::default(),
        SolverConfig::default().optimize(false),
        SolverConfig::default().optimize(false).scc_interval(1),
    ] {
        let result = program.solve(config);
        assert_same_class(&result.graph, a, bb);
        assert_points_to(&result.graph, a, &[o1]);
        assert_points_to(&result.graph, bb, &[o1]);
    }
}

#[test]
fn test_node_bound_exceeded() {
    let config = SolverConfig::default().max_nodes(Some(2));
    let mut analysis = AndersenAnalysis::new(config).unwrap();
    analysis.create_value_node().unwrap();
    analysis.create_value_node().unwrap();

    let err = analysis.create_value_node().unwrap_err();
    assert!(matches!(err, PtaError::CapacityExceeded { limit: 2 }));
    assert!(analysis.is_aborted());
    assert!(matches!(analysis.solve(), Err(PtaError::Aborted)));
    assert!(analysis.graph().is_none());
}

#[test]
fn test_object_larger_than_bound() {
    let config = SolverConfig::default().max_nodes(Some(4));
    let mut analysis = AndersenAnalysis::new(config).unwrap();
    analysis.create_value_node().unwrap();

    assert!(matches!(
        analysis.create_object_node(4),
        Err(PtaError::CapacityExceeded { limit: 4 })
    ));
    assert!(analysis.graph().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// Fields
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_struct_fields_sensitive() {
    let program = parse_program(FIXTURE_STRUCT_FIELDS).unwrap();
    let result = program.solve(SolverConfig::default());
    let graph = &result.graph;

    assert_points_to(graph, 3, &[5]);
    assert_points_to(graph, 4, &[6]);
    assert_points_to(graph, 7, &[6]);
    assert_sound(graph, &program.constraints, true);
}

#[test]
fn test_struct_fields_insensitive() {
    let program = parse_program(FIXTURE_STRUCT_FIELDS).unwrap();
    let result = program.solve(SolverConfig::from_preset(Preset::Fast));
    let graph = &result.graph;

    assert_points_to(graph, 3, &[5, 6]);
    assert_points_to_nothing(graph, 4);
    assert_points_to(graph, 7, &[5, 6]);
    assert_sound(graph, &program.constraints, false);
}

#[test]
fn test_offset_past_object_uses_base() {
    let mut b = ProgramBuilder::new();
    let p = b.value();
    let q = b.value();
    let out = b.value();
    let small = b.object();
    let wide = b.object_with_fields(3);
    let target = b.object();
    b.addr_of(p, small)
        .addr_of(q, target)
        .store(p, q, 2)
        .load(out, p, 2)
        // `wide` makes offset 2 a legal access
        .addr_of(out, wide);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, small, &[target]);
    assert_points_to(&result.graph, out, &[wide, target]);
}

#[test]
fn test_field_pointer_store_and_load() {
    let mut b = ProgramBuilder::new();
    let p = b.value();
    let f = b.value();
    let src = b.value();
    let out = b.value();
    let s = b.object_with_fields(3);
    let payload = b.object();
    b.addr_of(p, s)
        .addr_of(src, payload)
        .copy(f, p)
        .store(f, src, 2)
        .load(out, p, 2);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    assert_points_to(&result.graph, s + 2, &[payload]);
    assert_points_to_nothing(&result.graph, s);
    assert_points_to(&result.graph, out, &[payload]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Special nodes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_special_nodes() {
    let mut b = ProgramBuilder::new();
    let null = b.special(SpecialKind::Null);
    let universal = b.special(SpecialKind::Universal);
    let p = b.value();
    let q = b.value();
    let r = b.value();
    b.addr_of(p, null).addr_of(q, universal).load(r, q, 0).copy(r, p);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    let graph = &result.graph;
    assert_points_to(graph, p, &[null]);
    assert_points_to(graph, universal, &[universal]);
    assert_points_to(graph, r, &[null, universal]);
    assert_points_to_nothing(graph, null);
}

#[test]
fn test_cycle_through_null_and_universal() {
    let mut b = ProgramBuilder::new();
    let null = b.special(SpecialKind::Null);
    let universal = b.special(SpecialKind::Universal);
    let p = b.value();
    let q = b.value();
    let x = b.value();
    let y = b.value();
    let o = b.object();
    // *p = x; y = *p; *q = y; x = *q joins x, null, y and universal in one cycle
    b.addr_of(p, null)
        .addr_of(q, universal)
        .addr_of(x, o)
        .store(p, x, 0)
        .load(y, p, 0)
        .store(q, y, 0)
        .load(x, q, 0);
    let program = b.build();

    let configs = [
        SolverConfig::default(),
        SolverConfig::default().optimize(false),
        SolverConfig::default().optimize(false).scc_interval(1),
        SolverConfig::from_preset(Preset::Thorough),
    ];
    for config in configs {
        let result = program.solve(config);
        let graph = &result.graph;
        for n in [x, y, null, universal] {
            assert_points_to(graph, n, &[universal, o]);
        }
        assert!(!graph.same_class(null, universal));
        assert_sound(graph, &program.constraints, true);
    }
}

#[test]
fn test_static_copy_cycle_through_null_and_universal() {
    let mut b = ProgramBuilder::new();
    let null = b.special(SpecialKind::Null);
    let universal = b.special(SpecialKind::Universal);
    let v = b.value();
    let o = b.object();
    b.addr_of(v, o).copy(null, v).copy(universal, null).copy(v, universal);
    let program = b.build();

    let result = program.solve(SolverConfig::default());
    let graph = &result.graph;
    for n in [v, null, universal] {
        assert_points_to(graph, n, &[universal, o]);
    }
    assert_same_class(graph, v, null);
    assert!(!graph.same_class(null, universal));
}

#[test]
fn test_invalid_addr_of_rejected() {
    let mut analysis = AndersenAnalysis::default();
    let a = analysis.create_value_node().unwrap();
    let b = analysis.create_value_node().unwrap();
    analysis.add_constraint(Constraint::copy(a, b)).unwrap();
    analysis.add_constraint(Constraint::addr_of(a, b)).unwrap();

    assert!(matches!(
        analysis.solve(),
        Err(PtaError::InvalidConstraint { index: 1, .. })
    ));
    assert!(analysis.graph().is_none());
}

#[test]
fn test_unknown_endpoint_rejected() {
    let mut analysis = AndersenAnalysis::default();
    let a = analysis.create_value_node().unwrap();
    analysis.add_constraint(Constraint::copy(a, 17)).unwrap();
    assert!(matches!(
        analysis.solve(),
        Err(PtaError::InvalidConstraint { index: 0, .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// Larger programs
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_long_copy_chain() {
    let program = fixture_copy_chain(5_000);
    let obj = program.num_nodes() - 1;
    let result = program.solve(SolverConfig::default().optimize(false));

    for v in 0..obj {
        assert_points_to(&result.graph, v, &[obj]);
    }
}

#[test]
fn test_joined_cycles() {
    let program = fixture_many_cycles(8, 4);
    let result = program.solve(SolverConfig::default().optimize(false));
    let graph = &result.graph;
    assert_sound(graph, &program.constraints, true);

    // ring i has values 5i..5i+3 and its object at 5i+4
    for i in 0..8u32 {
        let head = 5 * i;
        assert_same_class(graph, head, head + 3);
        let expected: Vec<u32> = (0..=i).map(|j| 5 * j + 4).collect();
        assert_points_to(graph, head + 1, &expected);
    }
}

#[test]
fn test_indirection_fixture() {
    let program = fixture_indirection(32);
    for config in [SolverConfig::default(), SolverConfig::from_preset(Preset::Thorough)] {
        let result = program.solve(config);
        assert_sound(&result.graph, &program.constraints, true);
        // payload is node 1; every `out` is the third node of its group
        for i in 0..32u32 {
            assert_points_to(&result.graph, 3 + 4 * i + 3, &[1]);
        }
    }
}
