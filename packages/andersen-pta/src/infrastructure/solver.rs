//! Andersen's Points-to Analysis Solver
//!
//! Worklist fixpoint over inclusion constraints:
//! - ADDR_OF seeds points-to sets once
//! - Each pop handles only the pointees the node has not passed on yet
//!   (difference propagation): they go along every COPY edge and through
//!   LOAD/STORE, which materialize new COPY edges
//! - A new edge carries the full source set once
//! - Online cycle detection collapses SCCs of the growing copy graph
//!
//! # State
//! Every per-node vector is indexed by NodeIndex and is live only at class
//! representatives. Points-to sets hold pointee identities; they are never
//! rewritten when pointees merge, so field routing stays exact.
//!
//! # References
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Pearce et al. "Online Cycle Detection and Difference Propagation" (SCAM 2003)
//! - Pearce et al. "Efficient Field-Sensitive Pointer Analysis" (CC 2004)

use super::node_factory::NodeFactory;
use super::optimizer::validate_constraints;
use super::scc_detector::tarjan_scc_from;
use super::worklist::Worklist;
use crate::config::SolverConfig;
use crate::domain::{
    ConstraintKind, ConstraintSet, NodeIndex, NodeKind, PointsToGraph, PointsToSet, SpecialKind,
};
use crate::errors::{PtaError, Resource, Result};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Statistics for one solver run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolverStats {
    pub constraints_total: usize,
    pub constraints_addr_of: usize,
    pub constraints_copy: usize,
    pub constraints_load: usize,
    pub constraints_store: usize,
    /// Nodes popped and processed
    pub iterations: usize,
    /// Set unions that added at least one pointee
    pub propagations: usize,
    /// Pointees pushed along copy edges
    pub pointees_sent: usize,
    /// (node, pointee) memberships added by this run
    pub new_memberships: usize,
    /// Copy edges created from LOAD/STORE
    pub materialized_edges: usize,
    pub scc_passes: usize,
    pub sccs_collapsed: usize,
    pub nodes_collapsed: usize,
    /// (node, pointee) memberships currently held
    pub total_memberships: usize,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Solved,
    Aborted,
}

/// Worklist solver context
///
/// Owns the node table, the union-find, all points-to sets, the copy graph
/// and the worklist for one run.
#[derive(Debug)]
pub struct ConstraintSolver {
    config: SolverConfig,
    nodes: NodeFactory,
    constraints: ConstraintSet,

    /// Points-to set per representative
    pts: Vec<PointsToSet>,

    /// Copy successors per representative (targets may be stale)
    succs: Vec<FxHashSet<NodeIndex>>,

    /// LOAD d = *(n + k) keyed by pointer n: (d, k)
    loads: Vec<Vec<(NodeIndex, u32)>>,

    /// STORE *(n + k) = s keyed by pointer n: (s, k)
    stores: Vec<Vec<(NodeIndex, u32)>>,

    /// Pointees a node has already passed on; `pts \ done` is pending work
    done: Vec<PointsToSet>,

    worklist: Worklist,

    /// Start nodes for the next cycle detection pass
    recent: FxHashSet<NodeIndex>,

    indexed: bool,
    since_scc: usize,
    membership: usize,
    merges_at_start: usize,
    phase: Phase,
    started: Option<Instant>,
    stats: SolverStats,
}

impl ConstraintSolver {
    /// Solver over `nodes`; the configured node and merge bounds are applied
    /// to the factory
    pub fn new(config: SolverConfig, mut nodes: NodeFactory, constraints: ConstraintSet) -> Self {
        nodes.apply_limits(&config.limits);
        let n = nodes.len();
        let stats = SolverStats {
            constraints_total: constraints.len(),
            constraints_addr_of: constraints.addr_of_count,
            constraints_copy: constraints.copy_count,
            constraints_load: constraints.load_count,
            constraints_store: constraints.store_count,
            ..Default::default()
        };
        Self {
            worklist: Worklist::new(config.worklist),
            config,
            nodes,
            constraints,
            pts: vec![PointsToSet::new(); n],
            succs: vec![FxHashSet::default(); n],
            loads: vec![Vec::new(); n],
            stores: vec![Vec::new(); n],
            done: vec![PointsToSet::new(); n],
            recent: FxHashSet::default(),
            indexed: false,
            since_scc: 0,
            membership: 0,
            merges_at_start: 0,
            phase: Phase::Fresh,
            started: None,
            stats,
        }
    }

    /// Run to the fixpoint
    ///
    /// Calling it again on a solved solver re-seeds and re-propagates
    /// everything without changing any set.
    pub fn solve(&mut self) -> Result<()> {
        self.begin()?;
        while self.advance()? {}
        Ok(())
    }

    /// Process one node (or one exhaustion cycle pass)
    ///
    /// Returns `Ok(false)` once the fixpoint is reached.
    pub fn step(&mut self) -> Result<bool> {
        if self.phase != Phase::Running {
            self.begin()?;
        }
        self.advance()
    }

    fn begin(&mut self) -> Result<()> {
        if self.phase == Phase::Aborted {
            return Err(PtaError::Aborted);
        }
        let result = self.seed();
        self.guard(result)
    }

    fn advance(&mut self) -> Result<bool> {
        if self.phase == Phase::Aborted {
            return Err(PtaError::Aborted);
        }
        let result = self.advance_inner();
        let more = self.guard(result)?;
        if !more {
            self.finish();
        }
        Ok(more)
    }

    /// Mark the run aborted on any error
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(error = %e, "points-to solving aborted");
            self.phase = Phase::Aborted;
        }
        result
    }

    fn seed(&mut self) -> Result<()> {
        let start = Instant::now();
        if !self.indexed {
            self.nodes.check_capacity()?;
            validate_constraints(
                &self.nodes,
                &self.constraints.constraints,
                self.config.field_sensitive,
            )?;
            self.index_constraints();
        }

        self.reset_run_stats();
        self.started = Some(start);
        self.merges_at_start = self.nodes.merge_count();

        let addr_ofs: Vec<(NodeIndex, NodeIndex)> = self
            .constraints
            .addr_ofs()
            .map(|c| (c.dest, c.src))
            .collect();
        for (dest, src) in addr_ofs {
            let rep = self.nodes.find(dest);
            if self.pts[rep as usize].insert(src) {
                self.charge(1)?;
            }
        }

        let universals: Vec<NodeIndex> = self
            .nodes
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Special(SpecialKind::Universal))
            .map(|n| n.index)
            .collect();
        for u in universals {
            let rep = self.nodes.find(u);
            if self.pts[rep as usize].insert(u) {
                self.charge(1)?;
            }
        }

        for n in 0..self.pts.len() as NodeIndex {
            if !self.pts[n as usize].is_empty() && self.nodes.is_representative(n) {
                self.worklist.push(n);
            }
        }

        self.phase = Phase::Running;
        debug!(
            seeded = self.worklist.len(),
            memberships = self.membership,
            "solver seeded"
        );
        Ok(())
    }

    /// Build the per-pointer LOAD/STORE index and the static copy graph
    fn index_constraints(&mut self) {
        let constraints = std::mem::take(&mut self.constraints.constraints);
        for c in &constraints {
            match c.kind {
                ConstraintKind::AddrOf => {}
                ConstraintKind::Copy => {
                    let src = self.nodes.find(c.src);
                    let dest = self.nodes.find(c.dest);
                    if src != dest {
                        self.succs[src as usize].insert(dest);
                        self.recent.insert(src);
                    }
                }
                ConstraintKind::Load => {
                    let ptr = self.nodes.find(c.src);
                    self.loads[ptr as usize].push((c.dest, c.offset));
                }
                ConstraintKind::Store => {
                    let ptr = self.nodes.find(c.dest);
                    self.stores[ptr as usize].push((c.src, c.offset));
                }
            }
        }
        self.constraints.constraints = constraints;
        self.indexed = true;
    }

    fn reset_run_stats(&mut self) {
        let stats = &mut self.stats;
        stats.iterations = 0;
        stats.propagations = 0;
        stats.pointees_sent = 0;
        stats.new_memberships = 0;
        stats.materialized_edges = 0;
        stats.scc_passes = 0;
        stats.sccs_collapsed = 0;
        stats.nodes_collapsed = 0;
        stats.duration_ms = 0.0;
    }

    fn advance_inner(&mut self) -> Result<bool> {
        if self.config.scc_interval > 0 && self.since_scc >= self.config.scc_interval {
            self.detect_cycles()?;
        }

        if let Some(n) = self.worklist.pop() {
            self.process(n)?;
            return Ok(true);
        }

        // Worklist exhausted: a collapse re-enqueues survivors
        let collapsed = self.detect_cycles()?;
        Ok(collapsed > 0 || !self.worklist.is_empty())
    }

    fn finish(&mut self) {
        self.phase = Phase::Solved;
        self.stats.total_memberships = self.membership;
        if let Some(start) = self.started.take() {
            self.stats.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        }
        info!(
            iterations = self.stats.iterations,
            propagations = self.stats.propagations,
            memberships = self.stats.total_memberships,
            materialized_edges = self.stats.materialized_edges,
            sccs_collapsed = self.stats.sccs_collapsed,
            merges = self.nodes.merge_count() - self.merges_at_start,
            duration_ms = self.stats.duration_ms,
            "points-to fixpoint reached"
        );
    }

    /// Account for new memberships against the configured bound
    #[inline]
    fn charge(&mut self, added: usize) -> Result<()> {
        self.membership += added;
        self.stats.new_memberships += added;
        if let Some(limit) = self.config.limits.max_pts_membership {
            if self.membership > limit {
                return Err(PtaError::ResourceExceeded {
                    resource: Resource::PointsToMembership,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Union `pointees` into pts(to), queueing `to` if it grew
    fn send(&mut self, pointees: &PointsToSet, to: NodeIndex) -> Result<()> {
        self.stats.pointees_sent += pointees.len();
        let added = self.pts[to as usize].union_with(pointees);
        if added > 0 {
            self.stats.propagations += 1;
            self.charge(added)?;
            self.worklist.push(to);
        }
        Ok(())
    }

    /// Union the whole pts(from) into pts(to); both must be distinct
    /// representatives
    fn propagate(&mut self, from: NodeIndex, to: NodeIndex) -> Result<()> {
        let source = std::mem::take(&mut self.pts[from as usize]);
        let result = self.send(&source, to);
        self.pts[from as usize] = source;
        result
    }

    fn process(&mut self, popped: NodeIndex) -> Result<()> {
        let n = self.nodes.find(popped);
        self.stats.iterations += 1;
        self.since_scc += 1;
        self.recent.insert(n);

        let ni = n as usize;
        let delta: PointsToSet = self.pts[ni].difference(&self.done[ni]).collect();
        if delta.is_empty() {
            return Ok(());
        }
        self.done[ni].union_with(&delta);
        trace!(node = n, delta = delta.len(), pts = self.pts[ni].len(), "processing node");

        if !self.loads[ni].is_empty() || !self.stores[ni].is_empty() {
            let loads = std::mem::take(&mut self.loads[ni]);
            let stores = std::mem::take(&mut self.stores[ni]);
            let result = self.materialize(delta.as_slice(), &loads, &stores);
            self.loads[ni] = loads;
            self.stores[ni] = stores;
            result?;
        }

        // Copy edges
        let mut stale = false;
        let mut targets: Vec<NodeIndex> = Vec::with_capacity(self.succs[ni].len());
        for &m in &self.succs[ni] {
            let rep = self.nodes.find_readonly(m);
            stale |= rep != m;
            if rep != n {
                targets.push(rep);
            }
        }
        if stale {
            targets.sort_unstable();
            targets.dedup();
            self.succs[ni] = targets.iter().copied().collect();
        }

        for m in targets {
            self.send(&delta, m)?;
        }
        Ok(())
    }

    /// Create the implicit COPY edges of LOAD/STORE for new pointees
    fn materialize(
        &mut self,
        fresh: &[NodeIndex],
        loads: &[(NodeIndex, u32)],
        stores: &[(NodeIndex, u32)],
    ) -> Result<()> {
        for &o in fresh {
            for &(dest, offset) in loads {
                let field = self.route(o, offset);
                self.add_edge(field, dest)?;
            }
            for &(src, offset) in stores {
                let field = self.route(o, offset);
                self.add_edge(src, field)?;
            }
        }
        Ok(())
    }

    /// Node accessed at `offset` past pointee `o`
    fn route(&self, o: NodeIndex, offset: u32) -> NodeIndex {
        let info = match self.nodes.node(o).and_then(|node| node.object_info()) {
            Some(info) => info,
            None => return o,
        };
        if !self.config.field_sensitive {
            return info.base;
        }
        if offset == 0 {
            return o;
        }
        match info.field(offset) {
            Some(field) => field,
            None => {
                warn!(
                    object = o,
                    offset,
                    field_count = info.field_count,
                    "field offset outside object layout, using base object"
                );
                info.base
            }
        }
    }

    /// Record copy edge `from → to`; a new edge carries pts(from) at once
    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Result<()> {
        let from = self.nodes.find(from);
        let to = self.nodes.find(to);
        if from == to || !self.succs[from as usize].insert(to) {
            return Ok(());
        }
        self.stats.materialized_edges += 1;
        self.recent.insert(from);
        trace!(from, to, "materialized copy edge");
        self.propagate(from, to)
    }

    /// Tarjan pass over the copy graph reachable from recent nodes
    ///
    /// Returns the number of nodes merged.
    fn detect_cycles(&mut self) -> Result<usize> {
        self.since_scc = 0;
        self.stats.scc_passes += 1;
        if self.recent.is_empty() {
            return Ok(0);
        }

        let mut roots: Vec<NodeIndex> = self
            .recent
            .drain()
            .map(|n| self.nodes.find_readonly(n))
            .collect();
        roots.sort_unstable();
        roots.dedup();

        let nodes = &self.nodes;
        let succs = &self.succs;
        let result = tarjan_scc_from(roots, |n, out| {
            out.extend(
                succs[n as usize]
                    .iter()
                    .map(|&m| nodes.find_readonly(m))
                    .filter(|&m| m != n),
            );
        });

        // NULL and UNIVERSAL stay apart; the edges between their groups remain
        let mut merged = 0;
        for component in &result.components {
            for group in self.nodes.mergeable_groups(component) {
                let mut rep = group[0];
                for &member in &group[1..] {
                    rep = self.collapse(rep, member)?;
                    merged += 1;
                }
                self.worklist.push(rep);
                self.stats.sccs_collapsed += 1;
            }
        }

        if merged > 0 {
            debug!(
                sccs = result.stats.scc_count,
                merged,
                largest = result.stats.largest_scc,
                visited = result.stats.visited_nodes,
                "online cycle collapse"
            );
        }
        self.stats.nodes_collapsed += merged;
        Ok(merged)
    }

    /// Merge two representatives and move all their solver state
    fn collapse(&mut self, a: NodeIndex, b: NodeIndex) -> Result<NodeIndex> {
        let rep = self.nodes.merge(a, b)?;
        let gone = if rep == a { b } else { a };
        let (ri, gi) = (rep as usize, gone as usize);

        let absorbed = std::mem::take(&mut self.pts[gi]);
        let added = self.pts[ri].union_with(&absorbed);
        self.membership = self.membership + added - absorbed.len();

        let edges = std::mem::take(&mut self.succs[gi]);
        self.succs[ri].extend(edges);
        self.succs[ri].remove(&rep);
        self.succs[ri].remove(&gone);

        let loads = std::mem::take(&mut self.loads[gi]);
        self.loads[ri].extend(loads);
        let stores = std::mem::take(&mut self.stores[gi]);
        self.stores[ri].extend(stores);

        self.done[ri].clear();
        self.done[gi].clear();
        self.recent.insert(rep);

        trace!(rep, gone, "collapsed node into representative");
        Ok(rep)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Current points-to set of `n` (resolved through the union-find)
    pub fn points_to(&self, n: NodeIndex) -> PointsToSet {
        if !self.nodes.contains(n) {
            return PointsToSet::new();
        }
        self.pts[self.nodes.find_readonly(n) as usize].clone()
    }

    #[inline]
    pub fn nodes(&self) -> &NodeFactory {
        &self.nodes
    }

    #[inline]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    #[inline]
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.phase == Phase::Solved
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    /// Freeze the solved state into a read-only graph
    pub fn into_graph(mut self) -> Result<PointsToGraph> {
        match self.phase {
            Phase::Solved => {}
            Phase::Aborted => return Err(PtaError::Aborted),
            Phase::Fresh | Phase::Running => {
                return Err(PtaError::internal("graph requested before the fixpoint"))
            }
        }

        let representatives = self.nodes.representatives();
        for (i, &rep) in representatives.iter().enumerate() {
            if rep as usize != i && !self.pts[i].is_empty() {
                return Err(PtaError::internal(format!(
                    "non-representative n{i} (class of n{rep}) holds a points-to set"
                )));
            }
        }

        Ok(PointsToGraph::freeze(
            self.nodes.nodes().to_vec(),
            representatives,
            self.pts,
        ))
    }
}
