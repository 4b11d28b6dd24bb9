//! Solver configuration
//!
//! One struct drives the optimizer, the solver and the diagnostics of a run.
//! Obtain one from a [`Preset`] and adjust it with the builder setters, or
//! load it from YAML (see [`super::io`]).

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};

/// Worklist pop order
///
/// The fixpoint is independent of this choice; it only changes how fast the
/// solver gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum WorklistStrategy {
    /// Breadth-first: pop the oldest pending node
    Fifo,
    /// Depth-first: pop the most recently queued node
    Lifo,
    /// Pop a uniformly random pending node (seeded, reproducible)
    Shuffled { seed: u64 },
}

impl Default for WorklistStrategy {
    fn default() -> Self {
        WorklistStrategy::Fifo
    }
}

/// Structural bounds for one run (`None` = unbounded)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of nodes in the node table
    pub max_nodes: Option<usize>,

    /// Maximum number of merges (offline and online combined)
    pub max_merges: Option<usize>,

    /// Maximum total number of (node, pointee) memberships
    pub max_pts_membership: Option<usize>,
}

impl ResourceLimits {
    /// No bounds at all
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn validate(&self) -> ConfigResult<()> {
        let checks = [
            ("limits.max_nodes", self.max_nodes),
            ("limits.max_merges", self.max_merges),
            ("limits.max_pts_membership", self.max_pts_membership),
        ];
        for (field, value) in checks {
            if let Some(0) = value {
                return Err(ConfigError::range_with_hint(
                    field,
                    0,
                    1,
                    usize::MAX,
                    "Use null (no bound) instead of 0",
                ));
            }
        }
        if let Some(n) = self.max_nodes {
            if n > u32::MAX as usize {
                return Err(ConfigError::range_with_hint(
                    "limits.max_nodes",
                    n,
                    1,
                    u32::MAX,
                    "Node indices are 32-bit",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration of one points-to analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Route offset-qualified LOAD/STORE to field nodes
    pub field_sensitive: bool,

    /// Run the constraint optimizer before solving
    pub optimize: bool,

    /// Collapse cycles of the static COPY graph before solving
    pub offline_cycle_detection: bool,

    /// Merge value nodes with identical incoming label sets before solving
    pub offline_equivalence: bool,

    /// Run online cycle detection after this many processed nodes
    /// (0 = only when the worklist is exhausted)
    pub scc_interval: usize,

    /// Worklist pop order
    pub worklist: WorklistStrategy,

    /// Structural bounds
    pub limits: ResourceLimits,

    /// Minimum node count before optimizer keys are computed in parallel
    pub parallel_threshold: usize,

    /// Emit the pretty constraint dump at debug level after optimizing
    pub dump_constraints: bool,

    /// Emit node info and the points-to dump at debug level after solving
    pub dump_result: bool,

    /// Emit the plain constraint dump before optimizing and the plain
    /// points-to dump after solving; both are kept on the result
    pub dump_debug: bool,
}

impl SolverConfig {
    /// Check ranges and cross-field conflicts
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scc_interval > 100_000_000 {
            return Err(ConfigError::range_with_hint(
                "scc_interval",
                self.scc_interval,
                0,
                100_000_000,
                "Use 0 to detect cycles only at worklist exhaustion",
            ));
        }

        if self.parallel_threshold == 0 {
            return Err(ConfigError::range_with_hint(
                "parallel_threshold",
                0,
                1,
                usize::MAX,
                "Parallel threshold must be at least one node",
            ));
        }

        if !self.optimize && (self.offline_cycle_detection || self.offline_equivalence) {
            return Err(ConfigError::conflict(
                "offline passes are enabled while the optimizer is disabled",
                "set optimize: true or disable offline_cycle_detection and offline_equivalence",
            ));
        }

        self.limits.validate()
    }

    /// Builder: Set field_sensitive
    pub fn field_sensitive(mut self, v: bool) -> Self {
        self.field_sensitive = v;
        self
    }

    /// Builder: Enable or disable the whole optimizer (and its passes)
    pub fn optimize(mut self, v: bool) -> Self {
        self.optimize = v;
        if !v {
            self.offline_cycle_detection = false;
            self.offline_equivalence = false;
        }
        self
    }

    /// Builder: Set offline_cycle_detection
    pub fn offline_cycle_detection(mut self, v: bool) -> Self {
        self.offline_cycle_detection = v;
        self
    }

    /// Builder: Set offline_equivalence
    pub fn offline_equivalence(mut self, v: bool) -> Self {
        self.offline_equivalence = v;
        self
    }

    /// Builder: Set scc_interval
    pub fn scc_interval(mut self, v: usize) -> Self {
        self.scc_interval = v;
        self
    }

    /// Builder: Set worklist strategy
    pub fn worklist(mut self, v: WorklistStrategy) -> Self {
        self.worklist = v;
        self
    }

    /// Builder: Set all limits
    pub fn limits(mut self, v: ResourceLimits) -> Self {
        self.limits = v;
        self
    }

    /// Builder: Set max_nodes
    pub fn max_nodes(mut self, v: Option<usize>) -> Self {
        self.limits.max_nodes = v;
        self
    }

    /// Builder: Set max_merges
    pub fn max_merges(mut self, v: Option<usize>) -> Self {
        self.limits.max_merges = v;
        self
    }

    /// Builder: Set max_pts_membership
    pub fn max_pts_membership(mut self, v: Option<usize>) -> Self {
        self.limits.max_pts_membership = v;
        self
    }

    /// Builder: Set parallel_threshold
    pub fn parallel_threshold(mut self, v: usize) -> Self {
        self.parallel_threshold = v;
        self
    }

    /// Builder: Set dump_constraints
    pub fn dump_constraints(mut self, v: bool) -> Self {
        self.dump_constraints = v;
        self
    }

    /// Builder: Set dump_result
    pub fn dump_result(mut self, v: bool) -> Self {
        self.dump_result = v;
        self
    }

    /// Builder: Set dump_debug
    pub fn dump_debug(mut self, v: bool) -> Self {
        self.dump_debug = v;
        self
    }

    /// Settings for a named preset
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                field_sensitive: false,
                optimize: true,
                offline_cycle_detection: true,
                offline_equivalence: false,
                scc_interval: 0,
                worklist: WorklistStrategy::Fifo,
                limits: ResourceLimits::unbounded(),
                parallel_threshold: 50_000,
                dump_constraints: false,
                dump_result: false,
                dump_debug: false,
            },
            Preset::Balanced => Self {
                field_sensitive: true,
                optimize: true,
                offline_cycle_detection: true,
                offline_equivalence: true,
                scc_interval: 1000,
                worklist: WorklistStrategy::Fifo,
                limits: ResourceLimits::unbounded(),
                parallel_threshold: 10_000,
                dump_constraints: false,
                dump_result: false,
                dump_debug: false,
            },
            Preset::Thorough => Self {
                field_sensitive: true,
                optimize: true,
                offline_cycle_detection: true,
                offline_equivalence: true,
                scc_interval: 64,
                worklist: WorklistStrategy::Lifo,
                limits: ResourceLimits::unbounded(),
                parallel_threshold: 512,
                dump_constraints: false,
                dump_result: false,
                dump_debug: false,
            },
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}
