/*
 * Andersen PTA - Inclusion-based Points-to Analysis Engine
 *
 * Hexagonal layout:
 * - domain/         : Nodes, constraints, points-to sets, the frozen graph
 * - infrastructure/ : Node factory, union-find, SCC, optimizer, solver
 * - application/    : Analysis pipeline, diagnostic dumps
 * - config/         : Presets, validation, YAML
 *
 * Performance:
 * - Difference propagation for LOAD/STORE
 * - Online cycle collapse restricted to changed regions
 * - Rayon-parallel offline key computation
 */

// Crate-level lint configuration
#![allow(clippy::derivable_impls)] // Manual impl for documentation
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::needless_range_loop)] // Range loop for indexing
#![allow(clippy::type_complexity)] // Index tables keyed by node

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports
// ═══════════════════════════════════════════════════════════════════════════

/// Analysis pipeline and diagnostic dumps
pub mod application;

/// Solver configuration (presets, builders, YAML)
pub mod config;

/// Domain models
pub mod domain;

/// Error types
pub mod errors;

/// Node table, optimizer and fixpoint engine
pub mod infrastructure;

pub use application::{AnalysisResult, AndersenAnalysis};
pub use config::{Preset, SolverConfig};
pub use domain::{Constraint, ConstraintKind, NodeIndex, PointsToGraph, PointsToSet, SpecialKind};
pub use errors::{PtaError, Result};
