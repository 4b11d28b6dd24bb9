//! Abstract Nodes
//!
//! Every variable and every memory object of the analyzed program is a node
//! in one dense table. Nodes are addressed by [`NodeIndex`]; all relations
//! between them are index-to-index, never owning links.
//!
//! # Layout of objects
//! An object with `k` fields occupies `k` consecutive indices:
//!
//! ```text
//! index:   b      b+1    b+2
//!          base   .f1    .f2      (field_count = 3)
//! ```
//!
//! Each of them is an OBJECT node that knows its base and its offset, so an
//! offset-qualified access can be routed to `base + offset`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense node handle (stable for one analysis run)
pub type NodeIndex = u32;

/// The two special pointees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Target of null pointers
    Null,
    /// Unknown memory; points to itself
    Universal,
}

impl SpecialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::Null => "null",
            SpecialKind::Universal => "universal",
        }
    }
}

/// Field layout of an object node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Index of the base object (itself for the base)
    pub base: NodeIndex,

    /// Field offset of this node relative to `base`
    pub offset: u32,

    /// Number of fields declared for the base object
    pub field_count: u32,
}

impl ObjectInfo {
    /// Whether this node is a struct field rather than the base
    #[inline]
    pub fn is_field(&self) -> bool {
        self.offset > 0
    }

    /// Node reached by adding `offset` to this node, if within the layout
    #[inline]
    pub fn field(&self, offset: u32) -> Option<NodeIndex> {
        let target = self.offset.checked_add(offset)?;
        if target < self.field_count {
            Some(self.base + target)
        } else {
            None
        }
    }
}

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A pointer-holding program variable
    Value,
    /// A memory object (or one of its fields)
    Object(ObjectInfo),
    /// One of the special pointees
    Special(SpecialKind),
}

/// One entry in the node table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub index: NodeIndex,
    pub kind: NodeKind,
}

impl Node {
    #[inline]
    pub fn value(index: NodeIndex) -> Self {
        Self {
            index,
            kind: NodeKind::Value,
        }
    }

    #[inline]
    pub fn object(index: NodeIndex, info: ObjectInfo) -> Self {
        Self {
            index,
            kind: NodeKind::Object(info),
        }
    }

    #[inline]
    pub fn special(index: NodeIndex, kind: SpecialKind) -> Self {
        Self {
            index,
            kind: NodeKind::Special(kind),
        }
    }

    /// Whether the node can appear inside a points-to set
    #[inline]
    pub fn is_pointee(&self) -> bool {
        !matches!(self.kind, NodeKind::Value)
    }

    #[inline]
    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self.kind {
            NodeKind::Special(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub fn object_info(&self) -> Option<ObjectInfo> {
        match self.kind {
            NodeKind::Object(info) => Some(info),
            _ => None,
        }
    }
}

/// Short label used by the diagnostic dumps: `v3`, `o5`, `null`, `universal`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Value => write!(f, "v{}", self.index),
            NodeKind::Object(_) => write!(f, "o{}", self.index),
            NodeKind::Special(kind) => write!(f, "{}", kind.as_str()),
        }
    }
}
