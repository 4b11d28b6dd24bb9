//! Andersen Analysis Pipeline
//!
//! One analysis run: node creation and constraint collection, then
//! optimize → solve → freeze.
//!
//! # Usage
//! ```text
//! use andersen_pta::application::AndersenAnalysis;
//! use andersen_pta::config::SolverConfig;
//! use andersen_pta::domain::Constraint;
//!
//! let mut analysis = AndersenAnalysis::new(SolverConfig::default())?;
//! let p = analysis.create_value_node()?;
//! let q = analysis.create_value_node()?;
//! let obj = analysis.create_object_node(1)?;
//!
//! analysis.add_constraint(Constraint::addr_of(p, obj))?;
//! analysis.add_constraint(Constraint::copy(q, p))?;
//!
//! let graph = analysis.solve()?;
//! assert!(graph.points_to(q).contains(obj));
//! ```
//!
//! # Lifecycle
//! Building → Frozen on a successful `solve`, Building → Aborted on any
//! error. A frozen run rejects mutation with `GraphFrozen`; an aborted run
//! answers everything with `Aborted`.

use super::dump::{self, DebugDump};
use crate::config::{Preset, SolverConfig};
use crate::domain::{Constraint, ConstraintSet, NodeIndex, PointsToGraph, SpecialKind};
use crate::errors::{PtaError, Result};
use crate::infrastructure::{
    ConstraintOptimizer, ConstraintSolver, NodeFactory, OptimizerStats, SolverStats,
};
use std::time::Instant;
use tracing::{debug, error, info};

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub graph: PointsToGraph,
    pub solver_stats: SolverStats,
    /// `None` when the optimizer is disabled
    pub optimizer_stats: Option<OptimizerStats>,
    /// Set when the run was configured with `dump_debug`
    pub debug_dump: Option<DebugDump>,
    pub duration_ms: f64,
}

#[derive(Debug)]
enum State {
    Building {
        nodes: NodeFactory,
        constraints: ConstraintSet,
    },
    Frozen(Box<AnalysisResult>),
    Aborted,
}

/// One points-to analysis run
#[derive(Debug)]
pub struct AndersenAnalysis {
    config: SolverConfig,
    state: State,
}

impl AndersenAnalysis {
    /// Create a run; fails if the configuration does not validate
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::with_config(SolverConfig::from_preset(preset))
    }

    fn with_config(config: SolverConfig) -> Self {
        let nodes = NodeFactory::with_limits(config.limits.max_nodes, config.limits.max_merges);
        Self {
            config,
            state: State::Building {
                nodes,
                constraints: ConstraintSet::new(),
            },
        }
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn building(&mut self) -> Result<(&mut NodeFactory, &mut ConstraintSet)> {
        match &mut self.state {
            State::Building { nodes, constraints } => Ok((nodes, constraints)),
            State::Frozen(_) => Err(PtaError::GraphFrozen),
            State::Aborted => Err(PtaError::Aborted),
        }
    }

    fn create(&mut self, make: impl FnOnce(&mut NodeFactory) -> Result<NodeIndex>) -> Result<NodeIndex> {
        let (nodes, _) = self.building()?;
        match make(nodes) {
            Ok(n) => Ok(n),
            Err(e) => {
                error!(error = %e, "node creation failed, aborting analysis");
                self.state = State::Aborted;
                Err(e)
            }
        }
    }

    pub fn create_value_node(&mut self) -> Result<NodeIndex> {
        self.create(|nodes| nodes.create_value_node())
    }

    /// Object with `field_count` field nodes; returns the base index
    pub fn create_object_node(&mut self, field_count: u32) -> Result<NodeIndex> {
        self.create(|nodes| nodes.create_object_node(field_count))
    }

    pub fn create_special_node(&mut self, kind: SpecialKind) -> Result<NodeIndex> {
        self.create(|nodes| nodes.create_special_node(kind))
    }

    /// Record a constraint; it is validated when the run is solved
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<()> {
        let (_, constraints) = self.building()?;
        constraints.add(constraint);
        Ok(())
    }

    pub fn add_constraints(&mut self, constraints: impl IntoIterator<Item = Constraint>) -> Result<()> {
        let (_, set) = self.building()?;
        set.extend(constraints);
        Ok(())
    }

    /// Number of nodes created so far
    pub fn num_nodes(&self) -> usize {
        match &self.state {
            State::Building { nodes, .. } => nodes.len(),
            State::Frozen(result) => result.graph.num_nodes(),
            State::Aborted => 0,
        }
    }

    /// Optimize, solve and freeze; later calls return the same graph
    pub fn solve(&mut self) -> Result<&PointsToGraph> {
        match std::mem::replace(&mut self.state, State::Aborted) {
            State::Building { nodes, constraints } => match self.run(nodes, constraints) {
                Ok(result) => self.state = State::Frozen(Box::new(result)),
                Err(e) => {
                    error!(error = %e, "points-to analysis aborted");
                    return Err(e);
                }
            },
            frozen @ State::Frozen(_) => self.state = frozen,
            State::Aborted => return Err(PtaError::Aborted),
        }
        self.graph().ok_or_else(|| PtaError::internal("frozen run without a graph"))
    }

    fn run(&self, mut nodes: NodeFactory, constraints: ConstraintSet) -> Result<AnalysisResult> {
        let start = Instant::now();
        let num_nodes = nodes.len();
        let num_constraints = constraints.len();

        let mut debug_dump = self.config.dump_debug.then(|| DebugDump {
            constraints: dump::constraints_plain(&constraints.constraints),
            points_to: String::new(),
        });
        if let Some(captured) = &debug_dump {
            debug!("constraints before optimization\n{}", captured.constraints);
        }

        let (constraints, optimizer_stats) = if self.config.optimize {
            let optimizer = ConstraintOptimizer::new(&self.config);
            let (optimized, stats) = optimizer.optimize(&mut nodes, &constraints)?;
            (optimized, Some(stats))
        } else {
            (constraints, None)
        };

        if self.config.dump_constraints {
            debug!(
                "constraints after optimization\n{}",
                dump::PrettyConstraints::new(nodes.nodes(), &constraints.constraints)
            );
        }

        let mut solver = ConstraintSolver::new(self.config.clone(), nodes, constraints);
        solver.solve()?;
        let solver_stats = solver.stats().clone();
        let graph = solver.into_graph()?;

        if let Some(captured) = &mut debug_dump {
            captured.points_to = dump::points_to_plain(&graph);
            debug!("points-to sets at fixpoint\n{}", captured.points_to);
        }
        if self.config.dump_result {
            debug!("node info\n{}", dump::NodeInfo(&graph));
            debug!("points-to sets\n{}", dump::PlainPointsTo(&graph));
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            nodes = num_nodes,
            constraints = num_constraints,
            classes = graph.stats.total_classes,
            memberships = graph.stats.total_memberships,
            duration_ms,
            "andersen analysis complete"
        );

        Ok(AnalysisResult {
            graph,
            solver_stats,
            optimizer_stats,
            debug_dump,
            duration_ms,
        })
    }

    /// The frozen graph, once solved
    pub fn graph(&self) -> Option<&PointsToGraph> {
        match &self.state {
            State::Frozen(result) => Some(&result.graph),
            _ => None,
        }
    }

    /// Full result of a solved run
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            State::Frozen(result) => Some(result),
            _ => None,
        }
    }

    /// Consume the run and hand out its result
    pub fn into_result(self) -> Result<AnalysisResult> {
        match self.state {
            State::Frozen(result) => Ok(*result),
            State::Aborted => Err(PtaError::Aborted),
            State::Building { .. } => Err(PtaError::internal("analysis has not been solved")),
        }
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, State::Frozen(_))
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self.state, State::Aborted)
    }
}

impl Default for AndersenAnalysis {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}
