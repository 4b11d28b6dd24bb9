//! Points-to Graph
//!
//! The frozen result of a run: NodeIndex → PointsToSet, resolved through the
//! representative table captured at freeze time. Read-only by construction.

use super::node::{Node, NodeIndex};
use super::points_to_set::PointsToSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMPTY_SET: PointsToSet = PointsToSet::new();

/// Frozen points-to relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsToGraph {
    /// Node table
    nodes: Vec<Node>,

    /// Representative of each node (fully compressed)
    representatives: Vec<NodeIndex>,

    /// Points-to set per node index; non-empty only at representatives
    sets: Vec<PointsToSet>,

    /// Statistics
    pub stats: GraphStats,
}

/// Statistics about the points-to graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_classes: usize,
    pub merged_nodes: usize,
    pub nonempty_sets: usize,
    pub total_memberships: usize,
    pub max_points_to_size: usize,
}

impl GraphStats {
    pub fn avg_points_to_size(&self) -> f64 {
        if self.nonempty_sets == 0 {
            0.0
        } else {
            self.total_memberships as f64 / self.nonempty_sets as f64
        }
    }
}

impl PointsToGraph {
    /// Freeze solver state into a graph.
    ///
    /// `representatives[i]` must be the final representative of `i`, and
    /// `sets` must be indexed by node with empty entries at non-representatives.
    pub(crate) fn freeze(
        nodes: Vec<Node>,
        representatives: Vec<NodeIndex>,
        mut sets: Vec<PointsToSet>,
    ) -> Self {
        sets.resize(nodes.len(), PointsToSet::new());

        let mut stats = GraphStats {
            total_nodes: nodes.len(),
            ..Default::default()
        };
        for (i, &rep) in representatives.iter().enumerate() {
            if rep as usize == i {
                stats.total_classes += 1;
            } else {
                stats.merged_nodes += 1;
            }
        }
        for set in sets.iter().filter(|s| !s.is_empty()) {
            stats.nonempty_sets += 1;
            stats.total_memberships += set.len();
            stats.max_points_to_size = stats.max_points_to_size.max(set.len());
        }

        Self {
            nodes,
            representatives,
            sets,
            stats,
        }
    }

    /// Points-to set of `n` (empty for unseeded or unknown nodes)
    #[inline]
    pub fn points_to(&self, n: NodeIndex) -> &PointsToSet {
        let rep = self.representative_of(n);
        self.sets.get(rep as usize).unwrap_or(&EMPTY_SET)
    }

    /// Representative of `n` (`n` itself if unknown)
    #[inline]
    pub fn representative_of(&self, n: NodeIndex) -> NodeIndex {
        self.representatives.get(n as usize).copied().unwrap_or(n)
    }

    #[inline]
    pub fn same_class(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.representative_of(a) == self.representative_of(b)
    }

    #[inline]
    pub fn node(&self, n: NodeIndex) -> Option<&Node> {
        self.nodes.get(n as usize)
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Every node with a non-empty set, ascending by index
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &PointsToSet)> + '_ {
        (0..self.nodes.len() as NodeIndex)
            .map(move |n| (n, self.points_to(n)))
            .filter(|(_, set)| !set.is_empty())
    }

    /// Merge partition: every class as its sorted member list,
    /// ordered by smallest member
    pub fn classes(&self) -> Vec<Vec<NodeIndex>> {
        let mut by_rep: FxHashMap<NodeIndex, Vec<NodeIndex>> = FxHashMap::default();
        for (i, &rep) in self.representatives.iter().enumerate() {
            by_rep.entry(rep).or_default().push(i as NodeIndex);
        }
        let mut classes: Vec<Vec<NodeIndex>> = by_rep.into_values().collect();
        classes.sort_unstable_by_key(|members| members[0]);
        classes
    }

    /// Serialize the whole graph
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for PointsToGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PointsToGraph {{")?;
        writeln!(f, "  nodes: {}", self.stats.total_nodes)?;
        writeln!(f, "  classes: {}", self.stats.total_classes)?;
        writeln!(f, "  non-empty sets: {}", self.stats.nonempty_sets)?;
        writeln!(f, "  memberships: {}", self.stats.total_memberships)?;
        writeln!(f, "  max pts size: {}", self.stats.max_points_to_size)?;
        writeln!(f, "  avg pts size: {:.2}", self.stats.avg_points_to_size())?;
        writeln!(f, "}}")
    }
}
