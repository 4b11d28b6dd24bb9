//! Points-to Sets
//!
//! Sorted, deduplicated `Vec<u32>` of pointee nodes.
//!
//! Membership is a binary search; union is a linear merge of two sorted
//! runs. Iteration is always ascending.

use super::node::NodeIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordered set of pointee nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsToSet {
    elements: Vec<NodeIndex>,
}

impl PointsToSet {
    /// Create an empty set
    #[inline]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn singleton(element: NodeIndex) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Insert an element; returns true if it was not present
    pub fn insert(&mut self, element: NodeIndex) -> bool {
        match self.elements.binary_search(&element) {
            Ok(_) => false,
            Err(pos) => {
                self.elements.insert(pos, element);
                true
            }
        }
    }

    #[inline]
    pub fn contains(&self, element: NodeIndex) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Iterate in ascending order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.elements.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[NodeIndex] {
        &self.elements
    }

    /// Union in place; returns the number of elements added
    pub fn union_with(&mut self, other: &PointsToSet) -> usize {
        if other.elements.is_empty() {
            return 0;
        }
        if self.elements.is_empty() {
            self.elements = other.elements.clone();
            return self.elements.len();
        }
        // A handful of pointees into a large set: insert in place
        if other.elements.len() * 8 < self.elements.len() {
            return other.elements.iter().filter(|&&e| self.insert(e)).count();
        }

        let before = self.elements.len();
        let mut merged = Vec::with_capacity(before + other.elements.len());
        let mut i = 0;
        let mut j = 0;

        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => {
                    merged.push(self.elements[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.elements[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    merged.push(self.elements[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.elements[i..]);
        merged.extend_from_slice(&other.elements[j..]);

        let added = merged.len() - before;
        if added > 0 {
            self.elements = merged;
        }
        added
    }

    /// Elements of `self` not in `other`, in ascending order
    pub fn difference<'a>(&'a self, other: &'a PointsToSet) -> impl Iterator<Item = NodeIndex> + 'a {
        let mut j = 0;
        self.elements.iter().copied().filter(move |&e| {
            while j < other.elements.len() && other.elements[j] < e {
                j += 1;
            }
            !(j < other.elements.len() && other.elements[j] == e)
        })
    }

    /// `self ⊆ other`
    pub fn is_subset_of(&self, other: &PointsToSet) -> bool {
        if self.elements.len() > other.elements.len() {
            return false;
        }
        self.difference(other).next().is_none()
    }

    /// True if some pointee is in both sets
    pub fn intersects(&self, other: &PointsToSet) -> bool {
        let mut i = 0;
        let mut j = 0;
        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => return true,
            }
        }
        false
    }
}

impl FromIterator<NodeIndex> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = NodeIndex>>(iter: I) -> Self {
        let mut elements: Vec<NodeIndex> = iter.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        Self { elements }
    }
}

impl<'a> IntoIterator for &'a PointsToSet {
    type Item = NodeIndex;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter().copied()
    }
}
