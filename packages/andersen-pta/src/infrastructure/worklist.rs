//! Solver Worklist
//!
//! Queue of representatives whose points-to set changed. A node is queued at
//! most once at a time; the pop order is set by [`WorklistStrategy`].

use crate::config::WorklistStrategy;
use crate::domain::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Deduplicating worklist with configurable pop order
#[derive(Debug, Clone)]
pub struct Worklist {
    queue: VecDeque<NodeIndex>,
    pending: FxHashSet<NodeIndex>,
    strategy: WorklistStrategy,
    rng: Option<StdRng>,
}

impl Default for Worklist {
    fn default() -> Self {
        Self::new(WorklistStrategy::default())
    }
}

impl Worklist {
    pub fn new(strategy: WorklistStrategy) -> Self {
        let rng = match strategy {
            WorklistStrategy::Shuffled { seed } => Some(StdRng::seed_from_u64(seed)),
            WorklistStrategy::Fifo | WorklistStrategy::Lifo => None,
        };
        Self {
            queue: VecDeque::new(),
            pending: FxHashSet::default(),
            strategy,
            rng,
        }
    }

    /// Queue `n`; returns false if it is already pending
    #[inline]
    pub fn push(&mut self, n: NodeIndex) -> bool {
        if !self.pending.insert(n) {
            return false;
        }
        self.queue.push_back(n);
        true
    }

    /// Take the next pending node
    pub fn pop(&mut self) -> Option<NodeIndex> {
        let n = match (self.strategy, self.rng.as_mut()) {
            (WorklistStrategy::Lifo, _) => self.queue.pop_back(),
            (WorklistStrategy::Shuffled { .. }, Some(rng)) if !self.queue.is_empty() => {
                let idx = rng.gen_range(0..self.queue.len());
                self.queue.swap_remove_back(idx)
            }
            _ => self.queue.pop_front(),
        }?;
        self.pending.remove(&n);
        Some(n)
    }

    #[inline]
    pub fn contains(&self, n: NodeIndex) -> bool {
        self.pending.contains(&n)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
