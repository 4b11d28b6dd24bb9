//! Points-to Constraints
//!
//! Four constraint kinds following Andersen's formulation:
//! - ADDR_OF: d = &s       → pts(d) ⊇ {s}
//! - COPY:    d = s        → pts(d) ⊇ pts(s)
//! - LOAD:    d = *(s + k) → ∀o ∈ pts(s): pts(d) ⊇ pts(o.k)
//! - STORE:   *(d + k) = s → ∀o ∈ pts(d): pts(o.k) ⊇ pts(s)

use super::node::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constraint kinds for points-to analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Base constraint: d = &s
    /// Semantics: s ∈ pts(d)
    AddrOf,

    /// Copy constraint: d = s
    /// Semantics: pts(d) ⊇ pts(s)
    Copy,

    /// Load constraint: d = *s
    /// Semantics: ∀o ∈ pts(s): pts(d) ⊇ pts(o)
    Load,

    /// Store constraint: *d = s
    /// Semantics: ∀o ∈ pts(d): pts(o) ⊇ pts(s)
    Store,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 4] = [
        ConstraintKind::AddrOf,
        ConstraintKind::Copy,
        ConstraintKind::Load,
        ConstraintKind::Store,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::AddrOf => "ADDR_OF",
            ConstraintKind::Copy => "COPY",
            ConstraintKind::Load => "LOAD",
            ConstraintKind::Store => "STORE",
        }
    }

    /// Numeric code used by the plain constraint dump
    #[inline]
    pub fn code(&self) -> u8 {
        match self {
            ConstraintKind::AddrOf => 0,
            ConstraintKind::Copy => 1,
            ConstraintKind::Load => 2,
            ConstraintKind::Store => 3,
        }
    }

    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ConstraintKind::AddrOf),
            1 => Some(ConstraintKind::Copy),
            2 => Some(ConstraintKind::Load),
            3 => Some(ConstraintKind::Store),
            _ => None,
        }
    }
}

/// A single constraint between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind
    pub kind: ConstraintKind,

    /// Left-hand side node
    /// - For STORE: the pointer being written through
    pub dest: NodeIndex,

    /// Right-hand side node
    /// - For ADDR_OF: the pointee itself
    /// - For LOAD: the pointer being read through
    pub src: NodeIndex,

    /// Field offset for LOAD/STORE (0 = the pointee itself)
    pub offset: u32,
}

impl Constraint {
    /// Create an ADDR_OF constraint: d = &s
    #[inline]
    pub fn addr_of(dest: NodeIndex, src: NodeIndex) -> Self {
        Self::new(ConstraintKind::AddrOf, dest, src, 0)
    }

    /// Create a COPY constraint: d = s
    #[inline]
    pub fn copy(dest: NodeIndex, src: NodeIndex) -> Self {
        Self::new(ConstraintKind::Copy, dest, src, 0)
    }

    /// Create a LOAD constraint: d = *s
    #[inline]
    pub fn load(dest: NodeIndex, src: NodeIndex) -> Self {
        Self::new(ConstraintKind::Load, dest, src, 0)
    }

    /// Create a STORE constraint: *d = s
    #[inline]
    pub fn store(dest: NodeIndex, src: NodeIndex) -> Self {
        Self::new(ConstraintKind::Store, dest, src, 0)
    }

    /// Create a field LOAD constraint: d = *(s + offset)
    #[inline]
    pub fn load_offset(dest: NodeIndex, src: NodeIndex, offset: u32) -> Self {
        Self::new(ConstraintKind::Load, dest, src, offset)
    }

    /// Create a field STORE constraint: *(d + offset) = s
    #[inline]
    pub fn store_offset(dest: NodeIndex, src: NodeIndex, offset: u32) -> Self {
        Self::new(ConstraintKind::Store, dest, src, offset)
    }

    #[inline]
    pub fn new(kind: ConstraintKind, dest: NodeIndex, src: NodeIndex, offset: u32) -> Self {
        Self {
            kind,
            dest,
            src,
            offset,
        }
    }

    /// LOAD and STORE act through a pointer; ADDR_OF and COPY do not
    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, ConstraintKind::Load | ConstraintKind::Store)
    }

    /// The operand whose pointees drive a complex constraint
    #[inline]
    pub fn pointer_operand(&self) -> Option<NodeIndex> {
        match self.kind {
            ConstraintKind::Load => Some(self.src),
            ConstraintKind::Store => Some(self.dest),
            ConstraintKind::AddrOf | ConstraintKind::Copy => None,
        }
    }
}

/// Plain dump line: `<type-code> <dest> <src> <offset>`
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.kind.code(),
            self.dest,
            self.src,
            self.offset
        )
    }
}

/// Constraint list with per-kind counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    /// All constraints, in insertion order
    pub constraints: Vec<Constraint>,

    pub addr_of_count: usize,
    pub copy_count: usize,
    pub load_count: usize,
    pub store_count: usize,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            constraints: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Append, keeping the counters in step
    pub fn add(&mut self, constraint: Constraint) {
        *self.count_mut(constraint.kind) += 1;
        self.constraints.push(constraint);
    }

    fn count_mut(&mut self, kind: ConstraintKind) -> &mut usize {
        match kind {
            ConstraintKind::AddrOf => &mut self.addr_of_count,
            ConstraintKind::Copy => &mut self.copy_count,
            ConstraintKind::Load => &mut self.load_count,
            ConstraintKind::Store => &mut self.store_count,
        }
    }

    /// Number of constraints of one kind
    pub fn count(&self, kind: ConstraintKind) -> usize {
        match kind {
            ConstraintKind::AddrOf => self.addr_of_count,
            ConstraintKind::Copy => self.copy_count,
            ConstraintKind::Load => self.load_count,
            ConstraintKind::Store => self.store_count,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Constraints of one kind, in insertion order
    pub fn by_kind(&self, kind: ConstraintKind) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.kind == kind)
    }

    /// ADDR_OF constraints seed the solver
    pub fn addr_ofs(&self) -> impl Iterator<Item = &Constraint> {
        self.by_kind(ConstraintKind::AddrOf)
    }

    pub fn copies(&self) -> impl Iterator<Item = &Constraint> {
        self.by_kind(ConstraintKind::Copy)
    }

    /// LOAD and STORE constraints
    pub fn complex(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_complex())
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut set = ConstraintSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Constraint> for ConstraintSet {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        for constraint in iter {
            self.add(constraint);
        }
    }
}
