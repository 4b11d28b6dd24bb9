//! Build → solve → freeze lifecycle of `AndersenAnalysis`

#[path = "../common/mod.rs"]
mod common;

use andersen_pta::application::AndersenAnalysis;
use andersen_pta::config::{Preset, ResourceLimits, SolverConfig};
use andersen_pta::domain::Constraint;
use andersen_pta::errors::{PtaError, Resource};
use common::*;

#[test]
fn test_mutation_after_freeze_rejected() {
    let mut analysis = AndersenAnalysis::default();
    let v = analysis.create_value_node().unwrap();
    let o = analysis.create_object_node(1).unwrap();
    analysis.add_constraint(Constraint::addr_of(v, o)).unwrap();
    analysis.solve().unwrap();

    assert!(matches!(analysis.create_value_node(), Err(PtaError::GraphFrozen)));
    assert!(matches!(analysis.create_object_node(2), Err(PtaError::GraphFrozen)));
    assert!(matches!(
        analysis.add_constraints([Constraint::copy(v, v)]),
        Err(PtaError::GraphFrozen)
    ));

    // rejected mutations leave the frozen graph usable
    assert!(analysis.is_frozen());
    assert_points_to(analysis.graph().unwrap(), v, &[o]);
}

#[test]
fn test_second_solve_returns_same_graph() {
    let program = fixture_copy_cycle(6);
    let mut analysis = program.analysis(SolverConfig::default()).unwrap();

    let first = snapshot(analysis.solve().unwrap());
    let classes = analysis.graph().unwrap().classes();
    let second = snapshot(analysis.solve().unwrap());

    assert_eq!(first, second);
    assert_eq!(classes, analysis.graph().unwrap().classes());
}

#[test]
fn test_capacity_failure_is_sticky() {
    let config = SolverConfig::default().max_nodes(Some(3));
    let mut analysis = AndersenAnalysis::new(config).unwrap();
    let v = analysis.create_value_node().unwrap();
    let o = analysis.create_object_node(1).unwrap();
    analysis.add_constraint(Constraint::addr_of(v, o)).unwrap();

    assert!(analysis.create_object_node(2).is_err());
    assert!(analysis.is_aborted());
    assert!(matches!(analysis.create_value_node(), Err(PtaError::Aborted)));
    assert!(matches!(
        analysis.add_constraint(Constraint::copy(v, v)),
        Err(PtaError::Aborted)
    ));
    assert!(matches!(analysis.solve(), Err(PtaError::Aborted)));
    assert!(analysis.graph().is_none());
    assert!(matches!(analysis.into_result(), Err(PtaError::Aborted)));
}

#[test]
fn test_membership_bound_aborts() {
    let program = fixture_copy_chain(50);
    let limits = ResourceLimits {
        max_pts_membership: Some(10),
        ..ResourceLimits::unbounded()
    };
    let config = SolverConfig::default().optimize(false).limits(limits);
    let mut analysis = program.analysis(config).unwrap();

    let err = analysis.solve().unwrap_err();
    assert!(matches!(
        err,
        PtaError::ResourceExceeded {
            resource: Resource::PointsToMembership,
            limit: 10
        }
    ));
    assert!(analysis.is_aborted());
    assert!(analysis.graph().is_none());
    assert!(analysis.result().is_none());
}

#[test]
fn test_merge_bound_aborts() {
    let program = fixture_copy_cycle(8);
    let config = SolverConfig::default().max_merges(Some(2));
    let mut analysis = program.analysis(config).unwrap();

    assert!(matches!(
        analysis.solve(),
        Err(PtaError::ResourceExceeded {
            resource: Resource::Merges,
            limit: 2
        })
    ));
    assert!(analysis.graph().is_none());
}

#[test]
fn test_unsolved_run_has_no_result() {
    let mut analysis = AndersenAnalysis::from_preset(Preset::Fast);
    analysis.create_value_node().unwrap();
    assert!(!analysis.is_frozen());
    assert!(analysis.graph().is_none());
    assert!(matches!(
        analysis.into_result(),
        Err(PtaError::InternalConsistency(_))
    ));
}

#[test]
fn test_result_statistics() {
    let program = fixture_copy_cycle(4);
    let result = program.solve(SolverConfig::default());

    let optimizer = result.optimizer_stats.as_ref().unwrap();
    assert_eq!(optimizer.input_constraints, 5);
    assert!(optimizer.offline_scc_merges >= 3);
    assert!(optimizer.output_constraints < optimizer.input_constraints);

    assert_eq!(result.graph.stats.total_nodes, 5);
    assert_eq!(result.graph.stats.merged_nodes, 3);
    assert_eq!(result.graph.stats.total_classes, 2);
    assert!(result.duration_ms >= 0.0);
}

#[test]
fn test_independent_runs() {
    let program = fixture_indirection(4);
    let a = program.solve(SolverConfig::default());
    let b = program.solve(SolverConfig::default());
    assert_eq!(snapshot(&a.graph), snapshot(&b.graph));
    assert_eq!(a.graph.classes(), b.graph.classes());
}
