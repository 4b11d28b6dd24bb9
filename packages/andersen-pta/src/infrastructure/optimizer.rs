//! Constraint Optimizer
//!
//! Shrinks the constraint graph before the fixpoint runs. Points-to results
//! are identical with and without it; only the number of classes, edges and
//! constraints the solver has to touch changes.
//!
//! Passes, in order:
//! 1. Validation (unknown nodes, bad offsets, non-pointee ADDR_OF sources)
//! 2. Endpoint rewrite through `find`
//! 3. Offline cycle collapse on the static COPY graph
//! 4. Offline equivalence (value classes with identical incoming labels)
//! 5. Self-copy and duplicate removal
//!
//! # References
//! - Rountev & Chandra "Off-line Variable Substitution for Scaling Points-to Analysis" (PLDI 2000)
//! - Hardekopf & Lin "Exploiting Pointer and Location Equivalence" (SAS 2007)

use super::node_factory::NodeFactory;
use super::scc_detector::tarjan_scc_from;
use crate::config::SolverConfig;
use crate::domain::{Constraint, ConstraintKind, ConstraintSet, NodeIndex};
use crate::errors::{PtaError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Incoming-label key tag for COPY sources (ADDR_OF labels use the raw index)
const COPY_LABEL: u64 = 1 << 32;

/// Optimizer statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizerStats {
    pub input_constraints: usize,
    pub output_constraints: usize,
    pub self_copies_removed: usize,
    pub duplicates_removed: usize,
    pub offline_scc_merges: usize,
    pub equivalence_merges: usize,
    pub equivalence_rounds: usize,
    pub duration_ms: f64,
}

/// Check every constraint against the node table
///
/// Offsets are checked against the largest declared field count only in
/// field-sensitive mode; field-insensitive runs ignore them.
pub fn validate_constraints(
    nodes: &NodeFactory,
    constraints: &[Constraint],
    field_sensitive: bool,
) -> Result<()> {
    for (index, c) in constraints.iter().enumerate() {
        for endpoint in [c.dest, c.src] {
            if !nodes.contains(endpoint) {
                return Err(PtaError::invalid_constraint(
                    index,
                    format!("unknown node n{endpoint} (table has {} nodes)", nodes.len()),
                ));
            }
        }

        match c.kind {
            ConstraintKind::AddrOf | ConstraintKind::Copy if c.offset != 0 => {
                return Err(PtaError::invalid_constraint(
                    index,
                    format!("{} does not take an offset (got {})", c.kind.as_str(), c.offset),
                ));
            }
            ConstraintKind::AddrOf if !nodes.is_pointee(c.src) => {
                return Err(PtaError::invalid_constraint(
                    index,
                    format!("ADDR_OF source n{} is not an object or special node", c.src),
                ));
            }
            ConstraintKind::Load | ConstraintKind::Store
                if field_sensitive && c.offset > 0 && c.offset >= nodes.max_field_count() =>
            {
                return Err(PtaError::invalid_constraint(
                    index,
                    format!(
                        "offset {} exceeds the largest field count {}",
                        c.offset,
                        nodes.max_field_count()
                    ),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Rewrite endpoints to current representatives (ADDR_OF sources keep
/// their pointee identity)
fn rewrite(nodes: &mut NodeFactory, constraints: &mut [Constraint]) {
    for c in constraints.iter_mut() {
        c.dest = nodes.find(c.dest);
        if c.kind != ConstraintKind::AddrOf {
            c.src = nodes.find(c.src);
        }
    }
}

/// Pre-solve constraint optimizer
#[derive(Debug, Clone)]
pub struct ConstraintOptimizer {
    field_sensitive: bool,
    offline_cycle_detection: bool,
    offline_equivalence: bool,
    parallel_threshold: usize,
}

impl ConstraintOptimizer {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            field_sensitive: config.field_sensitive,
            offline_cycle_detection: config.offline_cycle_detection,
            offline_equivalence: config.offline_equivalence,
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Run every enabled pass; merges go through `nodes`
    pub fn optimize(
        &self,
        nodes: &mut NodeFactory,
        constraints: &ConstraintSet,
    ) -> Result<(ConstraintSet, OptimizerStats)> {
        let start = Instant::now();
        let mut stats = OptimizerStats {
            input_constraints: constraints.len(),
            ..Default::default()
        };

        validate_constraints(nodes, &constraints.constraints, self.field_sensitive)?;

        let mut working = constraints.constraints.clone();
        rewrite(nodes, &mut working);

        if self.offline_cycle_detection {
            stats.offline_scc_merges = self.collapse_copy_cycles(nodes, &working)?;
            if stats.offline_scc_merges > 0 {
                rewrite(nodes, &mut working);
            }
        }

        if self.offline_equivalence {
            loop {
                let merged = self.merge_equivalent(nodes, &working)?;
                stats.equivalence_rounds += 1;
                if merged == 0 {
                    break;
                }
                stats.equivalence_merges += merged;
                rewrite(nodes, &mut working);
            }
        }

        let output = Self::dedup(working, &mut stats);
        stats.output_constraints = output.len();
        stats.duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            input = stats.input_constraints,
            output = stats.output_constraints,
            scc_merges = stats.offline_scc_merges,
            equivalence_merges = stats.equivalence_merges,
            "constraint optimization complete"
        );
        Ok((output, stats))
    }

    /// Merge every SCC of the static COPY graph (edge src → dest)
    fn collapse_copy_cycles(&self, nodes: &mut NodeFactory, constraints: &[Constraint]) -> Result<usize> {
        let mut adj: FxHashMap<NodeIndex, Vec<NodeIndex>> = FxHashMap::default();
        for c in constraints.iter().filter(|c| c.kind == ConstraintKind::Copy) {
            if c.src != c.dest {
                adj.entry(c.src).or_default().push(c.dest);
            }
        }
        if adj.is_empty() {
            return Ok(0);
        }

        let mut roots: Vec<NodeIndex> = adj.keys().copied().collect();
        roots.sort_unstable();

        let result = tarjan_scc_from(roots, |n, out| {
            if let Some(succs) = adj.get(&n) {
                out.extend_from_slice(succs);
            }
        });

        let mut merged = 0;
        for component in &result.components {
            for group in nodes.mergeable_groups(component) {
                let mut rep = group[0];
                for &member in &group[1..] {
                    rep = nodes.merge(rep, member)?;
                    merged += 1;
                }
            }
        }

        debug!(
            sccs = result.stats.scc_count,
            merged,
            largest = result.stats.largest_scc,
            "offline cycle collapse"
        );
        Ok(merged)
    }

    /// One round of offline equivalence; returns the number of merges
    ///
    /// Candidates are value-only classes that never receive a LOAD. Such a
    /// class receives exactly its ADDR_OF and COPY inputs, so two of them
    /// with the same non-empty label set end with the same points-to set.
    fn merge_equivalent(&self, nodes: &mut NodeFactory, constraints: &[Constraint]) -> Result<usize> {
        let mut load_dests: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut labels: FxHashMap<NodeIndex, Vec<u64>> = FxHashMap::default();

        for c in constraints {
            match c.kind {
                ConstraintKind::AddrOf => labels.entry(c.dest).or_default().push(c.src as u64),
                ConstraintKind::Copy => labels
                    .entry(c.dest)
                    .or_default()
                    .push(COPY_LABEL | c.src as u64),
                ConstraintKind::Load => {
                    load_dests.insert(c.dest);
                }
                ConstraintKind::Store => {}
            }
        }

        let mut candidates: Vec<(NodeIndex, Vec<u64>)> = labels
            .into_iter()
            .filter(|(rep, _)| !load_dests.contains(rep) && !nodes.class_has_pointee(*rep))
            .collect();
        candidates.sort_unstable_by_key(|(rep, _)| *rep);

        self.compute_keys(&mut candidates);

        let mut groups: FxHashMap<Vec<u64>, Vec<NodeIndex>> = FxHashMap::default();
        for (rep, key) in candidates {
            groups.entry(key).or_default().push(rep);
        }
        let mut groups: Vec<Vec<NodeIndex>> =
            groups.into_values().filter(|members| members.len() > 1).collect();
        groups.sort_unstable_by_key(|members| members[0]);

        let mut merged = 0;
        for members in &groups {
            let mut rep = members[0];
            for &member in &members[1..] {
                rep = nodes.merge(rep, member)?;
                merged += 1;
            }
        }

        if merged > 0 {
            debug!(groups = groups.len(), merged, "offline equivalence round");
        }
        Ok(merged)
    }

    /// Normalize label lists into exact keys (sorted, deduplicated)
    fn compute_keys(&self, candidates: &mut [(NodeIndex, Vec<u64>)]) {
        let normalize = |entry: &mut (NodeIndex, Vec<u64>)| {
            entry.1.sort_unstable();
            entry.1.dedup();
        };

        #[cfg(feature = "parallel")]
        if candidates.len() >= self.parallel_threshold {
            candidates.par_iter_mut().for_each(normalize);
            return;
        }

        candidates.iter_mut().for_each(normalize);
    }

    /// Drop self-copies and exact duplicates, keeping first occurrences
    fn dedup(constraints: Vec<Constraint>, stats: &mut OptimizerStats) -> ConstraintSet {
        let mut seen: FxHashSet<Constraint> = FxHashSet::default();
        let mut output = ConstraintSet::with_capacity(constraints.len());

        for c in constraints {
            if c.kind == ConstraintKind::Copy && c.dest == c.src {
                stats.self_copies_removed += 1;
                continue;
            }
            if !seen.insert(c) {
                stats.duplicates_removed += 1;
                continue;
            }
            output.add(c);
        }
        output
    }
}
