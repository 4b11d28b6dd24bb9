//! Configuration System
//!
//! Two tiers:
//! - Preset + builder setters for code
//! - Versioned YAML documents for files
//!
//! # Examples
//!
//! ```rust,ignore
//! use andersen_pta::config::{Preset, SolverConfig, WorklistStrategy};
//!
//! let config = SolverConfig::from_preset(Preset::Balanced)
//!     .scc_interval(0)
//!     .worklist(WorklistStrategy::Lifo)
//!     .max_pts_membership(Some(10_000_000));
//! config.validate()?;
//!
//! let config = SolverConfig::from_yaml_file("pta.yaml")?;
//! ```

pub mod error;
pub mod io;
pub mod preset;
pub mod solver_config;

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, SolverOverrides};
pub use preset::Preset;
pub use solver_config::{ResourceLimits, SolverConfig, WorklistStrategy};
