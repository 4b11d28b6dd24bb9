//! Custom assertions for test verification

use andersen_pta::domain::{Constraint, ConstraintKind, NodeIndex, PointsToGraph};

/// Assert the exact points-to set of `n`
pub fn assert_points_to(graph: &PointsToGraph, n: NodeIndex, expected: &[NodeIndex]) {
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    expected.dedup();
    assert_eq!(
        graph.points_to(n).as_slice(),
        expected.as_slice(),
        "points-to set of n{n}"
    );
}

/// Assert that `n` points to nothing
pub fn assert_points_to_nothing(graph: &PointsToGraph, n: NodeIndex) {
    assert!(
        graph.points_to(n).is_empty(),
        "expected empty set for n{n}, got {:?}",
        graph.points_to(n).as_slice()
    );
}

/// Assert that `a` and `b` were merged into one class
pub fn assert_same_class(graph: &PointsToGraph, a: NodeIndex, b: NodeIndex) {
    assert!(
        graph.same_class(a, b),
        "n{a} (rep {}) and n{b} (rep {}) should share a class",
        graph.representative_of(a),
        graph.representative_of(b)
    );
}

/// Where an access through pointee `o` at `offset` lands
pub fn route(graph: &PointsToGraph, o: NodeIndex, offset: u32, field_sensitive: bool) -> NodeIndex {
    let Some(info) = graph.node(o).and_then(|node| node.object_info()) else {
        return o;
    };
    if !field_sensitive {
        return info.base;
    }
    if offset == 0 {
        return o;
    }
    info.field(offset).unwrap_or(info.base)
}

fn subset_violation(
    graph: &PointsToGraph,
    c: &Constraint,
    from: NodeIndex,
    to: NodeIndex,
) -> Option<String> {
    let missing: Vec<NodeIndex> = graph.points_to(from).difference(graph.points_to(to)).collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("{c}: pts(n{from}) not within pts(n{to}), missing {missing:?}"))
    }
}

/// Every constraint violated by `graph`, described
pub fn soundness_violations(
    graph: &PointsToGraph,
    constraints: &[Constraint],
    field_sensitive: bool,
) -> Vec<String> {
    let mut violations = Vec::new();
    for c in constraints {
        match c.kind {
            ConstraintKind::AddrOf => {
                if !graph.points_to(c.dest).contains(c.src) {
                    violations.push(format!("{c}: n{} missing from pts(n{})", c.src, c.dest));
                }
            }
            ConstraintKind::Copy => violations.extend(subset_violation(graph, c, c.src, c.dest)),
            ConstraintKind::Load => {
                for o in graph.points_to(c.src).iter() {
                    let field = route(graph, o, c.offset, field_sensitive);
                    violations.extend(subset_violation(graph, c, field, c.dest));
                }
            }
            ConstraintKind::Store => {
                for o in graph.points_to(c.dest).iter() {
                    let field = route(graph, o, c.offset, field_sensitive);
                    violations.extend(subset_violation(graph, c, c.src, field));
                }
            }
        }
    }
    violations
}

/// Assert every constraint holds at the fixpoint
pub fn assert_sound(graph: &PointsToGraph, constraints: &[Constraint], field_sensitive: bool) {
    let violations = soundness_violations(graph, constraints, field_sensitive);
    assert!(violations.is_empty(), "unsound result:\n{}", violations.join("\n"));
}

/// Points-to set of every node, for whole-graph comparison
pub fn snapshot(graph: &PointsToGraph) -> Vec<Vec<NodeIndex>> {
    (0..graph.num_nodes() as NodeIndex)
        .map(|n| graph.points_to(n).as_slice().to_vec())
        .collect()
}
