//! Application layer for Points-to Analysis
//!
//! - **AndersenAnalysis**: one run from node creation to the frozen graph
//! - **dump**: diagnostic text formats

pub mod analysis;
pub mod dump;

pub use analysis::{AnalysisResult, AndersenAnalysis};
pub use dump::DebugDump;
