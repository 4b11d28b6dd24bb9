//! Copy-Graph Cycle Detection
//!
//! Tarjan's algorithm over copy edges. The offline pass runs it on the static
//! COPY graph; the solver runs it on the edges it has materialized so far.
//! Members of one cycle converge to the same set and collapse into one class.
//!
//! The search is iterative and can be restricted to what is reachable from a
//! given set of start nodes; online detection only looks at the part of the
//! graph that changed since the previous pass.
//!
//! # References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)
//! - Pearce, D. J. et al. "Online Cycle Detection and Difference Propagation" (2003)

use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::min;

/// Non-trivial components found by one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SccResult {
    /// Components with more than one member; each sorted, ordered by
    /// smallest member
    pub components: Vec<Vec<u32>>,

    /// Statistics
    pub stats: SccStats,
}

impl SccResult {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SccStats {
    pub visited_nodes: usize,
    pub visited_edges: usize,
    pub scc_count: usize,
    pub largest_scc: usize,
    pub collapsed_nodes: usize,
}

struct Frame {
    node: u32,
    successors: Vec<u32>,
    next: usize,
}

struct TarjanState {
    index: FxHashMap<u32, usize>,
    lowlink: FxHashMap<u32, usize>,
    on_stack: FxHashSet<u32>,
    stack: Vec<u32>,
    current_index: usize,
    edges: usize,
    components: Vec<Vec<u32>>,
}

impl TarjanState {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            lowlink: FxHashMap::default(),
            on_stack: FxHashSet::default(),
            stack: Vec::new(),
            current_index: 0,
            edges: 0,
            components: Vec::new(),
        }
    }

    fn visit<F>(&mut self, v: u32, successors: &mut F) -> Frame
    where
        F: FnMut(u32, &mut Vec<u32>),
    {
        self.index.insert(v, self.current_index);
        self.lowlink.insert(v, self.current_index);
        self.current_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);

        let mut out = Vec::new();
        successors(v, &mut out);
        self.edges += out.len();
        Frame {
            node: v,
            successors: out,
            next: 0,
        }
    }

    fn lower(&mut self, v: u32, value: usize) {
        if let Some(low) = self.lowlink.get_mut(&v) {
            *low = min(*low, value);
        }
    }

    /// Pop the component rooted at `v` off the stack
    fn emit(&mut self, v: u32) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.remove(&w);
            component.push(w);
            if w == v {
                break;
            }
        }
        if component.len() > 1 {
            component.sort_unstable();
            self.components.push(component);
        }
    }
}

/// Tarjan's SCC algorithm over the part of a graph reachable from `roots`
///
/// `successors(n, out)` appends the successors of `n` to `out`.
/// Self-loops never form a component.
///
/// Time: O(V + E) over the reachable part
/// Space: O(V)
pub fn tarjan_scc_from<I, F>(roots: I, mut successors: F) -> SccResult
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32, &mut Vec<u32>),
{
    let mut state = TarjanState::new();
    let mut frames: Vec<Frame> = Vec::new();

    for root in roots {
        if state.index.contains_key(&root) {
            continue;
        }
        let frame = state.visit(root, &mut successors);
        frames.push(frame);

        while let Some(frame) = frames.last_mut() {
            if frame.next < frame.successors.len() {
                let v = frame.node;
                let w = frame.successors[frame.next];
                frame.next += 1;

                match state.index.get(&w).copied() {
                    None => {
                        let child = state.visit(w, &mut successors);
                        frames.push(child);
                    }
                    Some(w_index) if state.on_stack.contains(&w) => state.lower(v, w_index),
                    Some(_) => {}
                }
                continue;
            }

            let v = frame.node;
            frames.pop();
            let v_low = state.lowlink.get(&v).copied().unwrap_or_default();
            if state.index.get(&v).copied() == Some(v_low) {
                state.emit(v);
            }
            if let Some(parent) = frames.last() {
                let parent = parent.node;
                state.lower(parent, v_low);
            }
        }
    }

    let mut components = state.components;
    components.sort_unstable_by_key(|c| c[0]);

    let stats = SccStats {
        visited_nodes: state.index.len(),
        visited_edges: state.edges,
        scc_count: components.len(),
        largest_scc: components.iter().map(Vec::len).max().unwrap_or(0),
        collapsed_nodes: components.iter().map(|c| c.len() - 1).sum(),
    };

    SccResult { components, stats }
}

/// Tarjan's SCC algorithm over an explicit edge list (`src → dst`)
pub fn tarjan_scc(edges: &[(u32, u32)]) -> SccResult {
    let mut adj: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
    let mut all_nodes: Vec<u32> = Vec::with_capacity(edges.len() * 2);

    for &(src, dst) in edges {
        adj.entry(src).or_default().push(dst);
        all_nodes.push(src);
        all_nodes.push(dst);
    }
    all_nodes.sort_unstable();
    all_nodes.dedup();

    tarjan_scc_from(all_nodes, |n, out| {
        if let Some(succs) = adj.get(&n) {
            out.extend_from_slice(succs);
        }
    })
}
