//! Diagnostic Dumps
//!
//! Text renderings built only on the public query interfaces:
//!
//! ```text
//! constraints (plain):   <type-code> <dest> <src> <offset>
//! points-to (plain):     <node> <obj1> <obj2> ...
//! constraints (pretty):  v2 = &o1 | v3 = v2 | v4 = *(v3 + 1) | *v3 = v4
//! ```
//!
//! Each rendering is a `Display` type, so a disabled log line never builds
//! the text; the `String` helpers wrap them.

use crate::domain::{Constraint, ConstraintKind, Node, NodeIndex, NodeKind, PointsToGraph};
use serde::Serialize;
use std::fmt;

const PRETTY_HEADER: &str = "----- Constraints -----";
const PRETTY_FOOTER: &str = "----- End of Print -----";

/// One `<type-code> <dest> <src> <offset>` line per constraint
#[derive(Debug, Clone, Copy)]
pub struct PlainConstraints<'a>(pub &'a [Constraint]);

impl fmt::Display for PlainConstraints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0 {
            writeln!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Node label, or `n<index>` for indices outside the table
struct Label<'a>(&'a [Node], NodeIndex);

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get(self.1 as usize) {
            Some(node) => write!(f, "{node}"),
            None => write!(f, "n{}", self.1),
        }
    }
}

/// `*p` or `*(p + k)`
struct Deref<'a>(Label<'a>, u32);

impl fmt::Display for Deref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            0 => write!(f, "*{}", self.0),
            offset => write!(f, "*({} + {offset})", self.0),
        }
    }
}

/// Human-readable constraint listing, framed by header and footer lines
#[derive(Debug, Clone, Copy)]
pub struct PrettyConstraints<'a> {
    nodes: &'a [Node],
    constraints: &'a [Constraint],
}

impl<'a> PrettyConstraints<'a> {
    pub fn new(nodes: &'a [Node], constraints: &'a [Constraint]) -> Self {
        Self { nodes, constraints }
    }
}

impl fmt::Display for PrettyConstraints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |n| Label(self.nodes, n);
        writeln!(f, "{PRETTY_HEADER}")?;
        for c in self.constraints {
            match c.kind {
                ConstraintKind::AddrOf => writeln!(f, "{} = &{}", label(c.dest), label(c.src))?,
                ConstraintKind::Copy => writeln!(f, "{} = {}", label(c.dest), label(c.src))?,
                ConstraintKind::Load => {
                    writeln!(f, "{} = {}", label(c.dest), Deref(label(c.src), c.offset))?
                }
                ConstraintKind::Store => {
                    writeln!(f, "{} = {}", Deref(label(c.dest), c.offset), label(c.src))?
                }
            }
        }
        writeln!(f, "{PRETTY_FOOTER}")
    }
}

/// One `<node> <obj1> <obj2> ...` line per node with a non-empty set
#[derive(Debug, Clone, Copy)]
pub struct PlainPointsTo<'a>(pub &'a PointsToGraph);

impl fmt::Display for PlainPointsTo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, set) in self.0.iter() {
            write!(f, "{n}")?;
            for o in set {
                write!(f, " {o}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One line per node: kind, field layout and representative
#[derive(Debug, Clone, Copy)]
pub struct NodeInfo<'a>(pub &'a PointsToGraph);

impl fmt::Display for NodeInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.0.nodes() {
            let rep = self.0.representative_of(node.index);
            match node.kind {
                NodeKind::Value => writeln!(f, "{} {node} value rep {rep}", node.index)?,
                NodeKind::Object(info) => writeln!(
                    f,
                    "{} {node} object base {} offset {} of {} rep {rep}",
                    node.index, info.base, info.offset, info.field_count
                )?,
                NodeKind::Special(kind) => {
                    writeln!(f, "{} {node} special {} rep {rep}", node.index, kind.as_str())?
                }
            }
        }
        Ok(())
    }
}

/// Plain dumps captured by a run with `dump_debug` set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebugDump {
    /// Constraints as collected, before the optimizer runs
    pub constraints: String,

    /// Points-to sets at the fixpoint
    pub points_to: String,
}

pub fn constraints_plain(constraints: &[Constraint]) -> String {
    PlainConstraints(constraints).to_string()
}

pub fn constraints_pretty(nodes: &[Node], constraints: &[Constraint]) -> String {
    PrettyConstraints::new(nodes, constraints).to_string()
}

pub fn points_to_plain(graph: &PointsToGraph) -> String {
    PlainPointsTo(graph).to_string()
}

pub fn node_info(graph: &PointsToGraph) -> String {
    NodeInfo(graph).to_string()
}
