//! Infrastructure: node table, optimizer and fixpoint engine

pub mod node_factory;
pub mod optimizer;
pub mod scc_detector;
pub mod solver;
pub mod union_find;
pub mod worklist;

pub use node_factory::NodeFactory;
pub use optimizer::{validate_constraints, ConstraintOptimizer, OptimizerStats};
pub use scc_detector::{tarjan_scc, tarjan_scc_from, SccResult, SccStats};
pub use solver::{ConstraintSolver, SolverStats};
pub use union_find::UnionFind;
pub use worklist::Worklist;
