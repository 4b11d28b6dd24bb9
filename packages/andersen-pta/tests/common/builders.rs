//! Test data builders
//!
//! `ProgramBuilder` records node declarations and constraints once, so the
//! same program can be replayed into an `AndersenAnalysis`, a bare
//! `ConstraintSolver`, or several runs with different configurations.

use andersen_pta::application::{AnalysisResult, AndersenAnalysis};
use andersen_pta::config::SolverConfig;
use andersen_pta::domain::{Constraint, ConstraintSet, NodeIndex, SpecialKind};
use andersen_pta::errors::Result;
use andersen_pta::infrastructure::{ConstraintSolver, NodeFactory};

/// One node creation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDecl {
    Value,
    /// Object with the given field count
    Object(u32),
    Special(SpecialKind),
}

/// Replayable analysis input
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<NodeDecl>,
    pub constraints: Vec<Constraint>,
    num_nodes: u32,
}

impl Program {
    #[inline]
    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    /// Every node index the program declares
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        0..self.num_nodes
    }

    /// Replay node creation and constraints into a fresh analysis run
    pub fn analysis(&self, config: SolverConfig) -> Result<AndersenAnalysis> {
        let mut analysis = AndersenAnalysis::new(config)?;
        for decl in &self.decls {
            match *decl {
                NodeDecl::Value => analysis.create_value_node()?,
                NodeDecl::Object(fields) => analysis.create_object_node(fields)?,
                NodeDecl::Special(kind) => analysis.create_special_node(kind)?,
            };
        }
        analysis.add_constraints(self.constraints.iter().copied())?;
        Ok(analysis)
    }

    /// Solve through the full pipeline
    pub fn solve(&self, config: SolverConfig) -> AnalysisResult {
        let mut analysis = self.analysis(config).expect("program replays");
        analysis.solve().expect("analysis solves");
        analysis.into_result().expect("solved run has a result")
    }

    /// Node table for a bare solver
    pub fn factory(&self) -> NodeFactory {
        let mut nodes = NodeFactory::new();
        for decl in &self.decls {
            match *decl {
                NodeDecl::Value => nodes.create_value_node(),
                NodeDecl::Object(fields) => nodes.create_object_node(fields),
                NodeDecl::Special(kind) => nodes.create_special_node(kind),
            }
            .expect("unbounded factory");
        }
        nodes
    }

    /// Bare solver over the unoptimized constraints
    pub fn solver(&self, config: SolverConfig) -> ConstraintSolver {
        let constraints: ConstraintSet = self.constraints.iter().copied().collect();
        ConstraintSolver::new(config, self.factory(), constraints)
    }
}

/// Builder for `Program`
///
/// Indices handed out mirror what `NodeFactory` assigns for the same
/// sequence of creation calls.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, decl: NodeDecl, width: u32) -> NodeIndex {
        let index = self.program.num_nodes;
        self.program.decls.push(decl);
        self.program.num_nodes += width;
        index
    }

    /// Declare a value node
    pub fn value(&mut self) -> NodeIndex {
        self.declare(NodeDecl::Value, 1)
    }

    /// Declare `count` value nodes
    pub fn values(&mut self, count: usize) -> Vec<NodeIndex> {
        (0..count).map(|_| self.value()).collect()
    }

    /// Declare a single-field object
    pub fn object(&mut self) -> NodeIndex {
        self.object_with_fields(1)
    }

    /// Declare an object; returns the base index
    pub fn object_with_fields(&mut self, fields: u32) -> NodeIndex {
        self.declare(NodeDecl::Object(fields), fields.max(1))
    }

    pub fn special(&mut self, kind: SpecialKind) -> NodeIndex {
        self.declare(NodeDecl::Special(kind), 1)
    }

    /// Add a constraint
    pub fn constraint(&mut self, constraint: Constraint) -> &mut Self {
        self.program.constraints.push(constraint);
        self
    }

    pub fn addr_of(&mut self, dest: NodeIndex, src: NodeIndex) -> &mut Self {
        self.constraint(Constraint::addr_of(dest, src))
    }

    pub fn copy(&mut self, dest: NodeIndex, src: NodeIndex) -> &mut Self {
        self.constraint(Constraint::copy(dest, src))
    }

    /// `dest = *(src + offset)`
    pub fn load(&mut self, dest: NodeIndex, src: NodeIndex, offset: u32) -> &mut Self {
        self.constraint(Constraint::load_offset(dest, src, offset))
    }

    /// `*(dest + offset) = src`
    pub fn store(&mut self, dest: NodeIndex, src: NodeIndex, offset: u32) -> &mut Self {
        self.constraint(Constraint::store_offset(dest, src, offset))
    }

    /// Build the program
    pub fn build(&self) -> Program {
        self.program.clone()
    }
}
