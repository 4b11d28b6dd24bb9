//! Node Factory
//!
//! Single source of truth for node identity: allocates VALUE, OBJECT and
//! SPECIAL nodes into one dense table and owns the union-find structure that
//! merges them. Per-class facts (which special kind a class holds, whether it
//! contains a pointee) live at the class root and move on every merge.

use super::union_find::UnionFind;
use crate::config::ResourceLimits;
use crate::domain::{Node, NodeIndex, ObjectInfo, SpecialKind};
use crate::errors::{PtaError, Resource, Result};
use tracing::trace;

/// Node table + union-find
#[derive(Debug, Clone, Default)]
pub struct NodeFactory {
    nodes: Vec<Node>,
    uf: UnionFind,

    /// Special kind held by the class (valid at roots)
    class_special: Vec<Option<SpecialKind>>,

    /// Whether the class contains a pointee (valid at roots)
    class_has_pointee: Vec<bool>,

    max_nodes: Option<usize>,
    max_merges: Option<usize>,
    merges: usize,
    max_field_count: u32,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with node and merge bounds (`None` = unbounded)
    pub fn with_limits(max_nodes: Option<usize>, max_merges: Option<usize>) -> Self {
        Self {
            max_nodes,
            max_merges,
            ..Self::default()
        }
    }

    /// Tighten the bounds to `limits`; an unset limit keeps the current one
    pub fn apply_limits(&mut self, limits: &ResourceLimits) {
        self.max_nodes = limits.max_nodes.or(self.max_nodes);
        self.max_merges = limits.max_merges.or(self.max_merges);
    }

    /// Fail if the table already holds more nodes than the node bound
    pub fn check_capacity(&self) -> Result<()> {
        let limit = self.node_limit();
        if self.nodes.len() > limit {
            return Err(PtaError::CapacityExceeded { limit });
        }
        Ok(())
    }

    fn node_limit(&self) -> usize {
        self.max_nodes
            .unwrap_or(u32::MAX as usize)
            .min(u32::MAX as usize)
    }

    fn reserve(&self, count: usize) -> Result<()> {
        let limit = self.node_limit();
        if self.nodes.len().saturating_add(count) > limit {
            return Err(PtaError::CapacityExceeded { limit });
        }
        Ok(())
    }

    fn push(&mut self, make: impl FnOnce(NodeIndex) -> Node) -> NodeIndex {
        let index = self.uf.push();
        let node = make(index);
        self.class_special.push(node.special_kind());
        self.class_has_pointee.push(node.is_pointee());
        self.nodes.push(node);
        index
    }

    /// Allocate a pointer-holding variable
    pub fn create_value_node(&mut self) -> Result<NodeIndex> {
        self.reserve(1)?;
        Ok(self.push(Node::value))
    }

    /// Allocate an object with `field_count` consecutive field nodes
    /// (0 is treated as 1); returns the base index
    pub fn create_object_node(&mut self, field_count: u32) -> Result<NodeIndex> {
        let field_count = field_count.max(1);
        self.reserve(field_count as usize)?;

        let base = self.nodes.len() as NodeIndex;
        for offset in 0..field_count {
            let info = ObjectInfo {
                base,
                offset,
                field_count,
            };
            self.push(|index| Node::object(index, info));
        }
        self.max_field_count = self.max_field_count.max(field_count);
        Ok(base)
    }

    /// Allocate a NULL or UNIVERSAL pointee
    pub fn create_special_node(&mut self, kind: SpecialKind) -> Result<NodeIndex> {
        self.reserve(1)?;
        Ok(self.push(|index| Node::special(index, kind)))
    }

    /// Representative of `n` (path-compressing)
    #[inline]
    pub fn find(&mut self, n: NodeIndex) -> NodeIndex {
        self.uf.find(n)
    }

    /// Representative of `n` without compression
    #[inline]
    pub fn find_readonly(&self, n: NodeIndex) -> NodeIndex {
        self.uf.find_readonly(n)
    }

    #[inline]
    pub fn is_representative(&self, n: NodeIndex) -> bool {
        self.uf.is_root(n)
    }

    /// Union the classes of `a` and `b`; returns the surviving representative
    pub fn merge(&mut self, a: NodeIndex, b: NodeIndex) -> Result<NodeIndex> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return Ok(ra);
        }

        let special_a = self.class_special[ra as usize];
        let special_b = self.class_special[rb as usize];
        if let (Some(ka), Some(kb)) = (special_a, special_b) {
            if ka != kb {
                return Err(PtaError::InvalidMerge {
                    a,
                    b,
                    reason: format!(
                        "classes hold different special nodes ({} and {})",
                        ka.as_str(),
                        kb.as_str()
                    ),
                });
            }
        }

        if let Some(limit) = self.max_merges {
            if self.merges >= limit {
                return Err(PtaError::ResourceExceeded {
                    resource: Resource::Merges,
                    limit,
                });
            }
        }

        let has_pointee = self.class_has_pointee[ra as usize] || self.class_has_pointee[rb as usize];
        let rep = self.uf.union(ra, rb);
        self.class_special[rep as usize] = special_a.or(special_b);
        self.class_has_pointee[rep as usize] = has_pointee;
        self.merges += 1;

        trace!(a = a, b = b, rep = rep, "merged node classes");
        Ok(rep)
    }

    /// Split a cycle's members into groups that can be merged
    ///
    /// Classes holding different special kinds never share a group; classes
    /// without one join the group of the first special kind in `members`.
    /// Only groups with two or more members are returned, each sorted.
    pub fn mergeable_groups(&self, members: &[NodeIndex]) -> Vec<Vec<NodeIndex>> {
        let mut special: Vec<(SpecialKind, Vec<NodeIndex>)> = Vec::new();
        let mut plain = Vec::new();
        for &m in members {
            match self.class_special(m) {
                None => plain.push(m),
                Some(kind) => match special.iter_mut().find(|(k, _)| *k == kind) {
                    Some((_, group)) => group.push(m),
                    None => special.push((kind, vec![m])),
                },
            }
        }

        let mut groups: Vec<Vec<NodeIndex>> = special.into_iter().map(|(_, g)| g).collect();
        match groups.first_mut() {
            Some(first) => first.extend(plain),
            None => groups.push(plain),
        }
        groups.retain(|g| g.len() > 1);
        for group in &mut groups {
            group.sort_unstable();
        }
        groups
    }

    #[inline]
    pub fn node(&self, n: NodeIndex) -> Option<&Node> {
        self.nodes.get(n as usize)
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn contains(&self, n: NodeIndex) -> bool {
        (n as usize) < self.nodes.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Merges performed so far (offline and online)
    #[inline]
    pub fn merge_count(&self) -> usize {
        self.merges
    }

    /// Whether `n` itself is an OBJECT or SPECIAL node
    #[inline]
    pub fn is_pointee(&self, n: NodeIndex) -> bool {
        self.node(n).is_some_and(Node::is_pointee)
    }

    /// Whether the class of `n` contains any pointee
    #[inline]
    pub fn class_has_pointee(&self, n: NodeIndex) -> bool {
        self.contains(n) && self.class_has_pointee[self.find_readonly(n) as usize]
    }

    /// Special kind held by the class of `n`, if any
    #[inline]
    pub fn class_special(&self, n: NodeIndex) -> Option<SpecialKind> {
        if !self.contains(n) {
            return None;
        }
        self.class_special[self.find_readonly(n) as usize]
    }

    /// Field node `offset` positions past object node `obj`
    ///
    /// `None` for non-objects and offsets outside the object's layout.
    #[inline]
    pub fn field_node(&self, obj: NodeIndex, offset: u32) -> Option<NodeIndex> {
        self.node(obj)?.object_info()?.field(offset)
    }

    /// Largest field count declared by any object
    #[inline]
    pub fn max_field_count(&self) -> u32 {
        self.max_field_count
    }

    /// Fully compressed representative table
    pub fn representatives(&mut self) -> Vec<NodeIndex> {
        self.uf.representatives()
    }
}
