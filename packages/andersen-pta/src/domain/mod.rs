//! Domain models for points-to analysis

pub mod constraint;
pub mod node;
pub mod points_to_graph;
pub mod points_to_set;

pub use constraint::{Constraint, ConstraintKind, ConstraintSet};
pub use node::{Node, NodeIndex, NodeKind, ObjectInfo, SpecialKind};
pub use points_to_graph::{GraphStats, PointsToGraph};
pub use points_to_set::PointsToSet;
