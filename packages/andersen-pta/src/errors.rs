//! Error types for andersen-pta
//!
//! Every failure of a run surfaces through [`PtaError`]. None of them leave a
//! queryable result behind: a partial fixpoint is unsound, not merely imprecise.

use crate::config::ConfigError;
use crate::domain::NodeIndex;
use std::fmt;
use thiserror::Error;

/// Structural resource guarded by a configured bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Total number of node merges (offline + online)
    Merges,
    /// Total number of distinct (node, pointee) memberships
    PointsToMembership,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Merges => "merge count",
            Resource::PointsToMembership => "points-to membership",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for points-to analysis runs
#[derive(Debug, Error)]
pub enum PtaError {
    /// Malformed constraint handed over by the front-end
    #[error("Invalid constraint #{index}: {reason}")]
    InvalidConstraint { index: usize, reason: String },

    /// Attempt to merge classes holding special nodes of different kinds
    #[error("Invalid merge of n{a} and n{b}: {reason}")]
    InvalidMerge {
        a: NodeIndex,
        b: NodeIndex,
        reason: String,
    },

    /// Node table bound exceeded during node creation
    #[error("Node capacity exceeded: limit is {limit} nodes")]
    CapacityExceeded { limit: usize },

    /// Merge or membership bound exceeded while optimizing or solving
    #[error("Resource exceeded: {resource} went over the limit of {limit}")]
    ResourceExceeded { resource: Resource, limit: usize },

    /// The graph is frozen; nodes and constraints can no longer change
    #[error("Points-to graph is frozen; the analysis no longer accepts mutations")]
    GraphFrozen,

    /// A previous failure aborted this run
    #[error("Analysis run was aborted; no points-to graph is available")]
    Aborted,

    /// Broken engine invariant. This is a defect, never a user error.
    #[error("Internal consistency failure: {0}")]
    InternalConsistency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PtaError {
    /// Create an invalid-constraint error for the constraint at `index`
    pub fn invalid_constraint(index: usize, reason: impl Into<String>) -> Self {
        PtaError::InvalidConstraint {
            index,
            reason: reason.into(),
        }
    }

    /// Create an internal consistency error
    pub fn internal(msg: impl Into<String>) -> Self {
        PtaError::InternalConsistency(msg.into())
    }

    /// Whether this error reflects a defect in the engine rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, PtaError::InternalConsistency(_))
    }
}

/// Result type alias for points-to operations
pub type Result<T> = std::result::Result<T, PtaError>;
