//! Node Class Table (Disjoint Set Union)
//!
//! Every node starts as its own class. Offline equivalence and cycle
//! collapsing join classes; a join is never undone within a run.
//!
//! - `find` halves paths as it walks, so repeated lookups flatten the tree
//! - `union` hangs the shallower tree below the deeper one
//!
//! # References
//! - Tarjan, R. E. "Efficiency of a Good But Not Linear Set Union Algorithm" (1975)
//! - Tarjan & van Leeuwen "Worst-case Analysis of Set Union Algorithms" (1984)

use crate::domain::NodeIndex;
use serde::{Deserialize, Serialize};

/// Class table over node indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionFind {
    /// Parent link per node; a root links to itself
    parent: Vec<NodeIndex>,

    /// Upper bound on the height below each root
    rank: Vec<u8>,

    classes: usize,
}

impl UnionFind {
    /// `n` singleton classes `0..n`
    pub fn new(n: usize) -> Self {
        let mut uf = Self::default();
        uf.reserve(n);
        for _ in 0..n {
            uf.push();
        }
        uf
    }

    fn reserve(&mut self, additional: usize) {
        self.parent.reserve(additional);
        self.rank.reserve(additional);
    }

    /// Add one singleton class; returns its node index
    pub fn push(&mut self) -> NodeIndex {
        let n = self.parent.len() as NodeIndex;
        self.parent.push(n);
        self.rank.push(0);
        self.classes += 1;
        n
    }

    /// Root of `n`'s class, halving the path on the way up
    #[inline]
    pub fn find(&mut self, mut n: NodeIndex) -> NodeIndex {
        loop {
            let parent = self.parent[n as usize];
            if parent == n {
                return n;
            }
            let grandparent = self.parent[parent as usize];
            self.parent[n as usize] = grandparent;
            n = grandparent;
        }
    }

    /// Root of `n`'s class without touching the links
    #[inline]
    pub fn find_readonly(&self, mut n: NodeIndex) -> NodeIndex {
        while self.parent[n as usize] != n {
            n = self.parent[n as usize];
        }
        n
    }

    #[inline]
    pub fn is_root(&self, n: NodeIndex) -> bool {
        self.parent[n as usize] == n
    }

    /// Join the classes of `a` and `b`; returns the surviving root
    pub fn union(&mut self, a: NodeIndex, b: NodeIndex) -> NodeIndex {
        let mut keep = self.find(a);
        let mut absorbed = self.find(b);
        if keep == absorbed {
            return keep;
        }

        if self.rank[keep as usize] < self.rank[absorbed as usize] {
            std::mem::swap(&mut keep, &mut absorbed);
        }
        let (k, d) = (keep as usize, absorbed as usize);
        self.parent[d] = keep;
        if self.rank[k] == self.rank[d] {
            self.rank[k] = self.rank[k].saturating_add(1);
        }

        self.classes -= 1;
        keep
    }

    #[inline]
    pub fn connected(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of classes
    #[inline]
    pub fn count(&self) -> usize {
        self.classes
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of every node, in index order
    pub fn representatives(&mut self) -> Vec<NodeIndex> {
        (0..self.len() as NodeIndex).map(|n| self.find(n)).collect()
    }
}
