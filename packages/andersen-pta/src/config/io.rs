//! Configuration I/O (YAML)
//!
//! Schema v1:
//!
//! ```yaml
//! version: 1
//! preset: balanced
//! overrides:
//!   field_sensitive: false
//!   scc_interval: 0
//!   limits:
//!     max_nodes: 100000
//!     max_merges: null
//!     max_pts_membership: 5000000
//! ```

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::solver_config::{ResourceLimits, SolverConfig, WorklistStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSION: u32 = 1;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Document format version; only 1 is accepted
    pub version: u32,

    /// Base preset
    pub preset: Preset,

    /// Fine-grained overrides applied on top of the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<SolverOverrides>,
}

/// Partial solver configuration; absent fields keep the preset value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_cycle_detection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_equivalence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scc_interval: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worklist: Option<WorklistStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_threshold: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_constraints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_debug: Option<bool>,
}

impl SolverOverrides {
    fn apply(self, mut config: SolverConfig) -> SolverConfig {
        if let Some(v) = self.field_sensitive {
            config.field_sensitive = v;
        }
        if let Some(v) = self.optimize {
            config.optimize = v;
        }
        if let Some(v) = self.offline_cycle_detection {
            config.offline_cycle_detection = v;
        }
        if let Some(v) = self.offline_equivalence {
            config.offline_equivalence = v;
        }
        if let Some(v) = self.scc_interval {
            config.scc_interval = v;
        }
        if let Some(v) = self.worklist {
            config.worklist = v;
        }
        if let Some(v) = self.limits {
            config.limits = v;
        }
        if let Some(v) = self.parallel_threshold {
            config.parallel_threshold = v;
        }
        if let Some(v) = self.dump_constraints {
            config.dump_constraints = v;
        }
        if let Some(v) = self.dump_result {
            config.dump_result = v;
        }
        if let Some(v) = self.dump_debug {
            config.dump_debug = v;
        }
        config
    }

    fn full(config: &SolverConfig) -> Self {
        Self {
            field_sensitive: Some(config.field_sensitive),
            optimize: Some(config.optimize),
            offline_cycle_detection: Some(config.offline_cycle_detection),
            offline_equivalence: Some(config.offline_equivalence),
            scc_interval: Some(config.scc_interval),
            worklist: Some(config.worklist),
            limits: Some(config.limits),
            parallel_threshold: Some(config.parallel_threshold),
            dump_constraints: Some(config.dump_constraints),
            dump_result: Some(config.dump_result),
            dump_debug: Some(config.dump_debug),
        }
    }
}

impl SolverConfig {
    /// Parse and validate a v1 YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(yaml)?;
        if file.version != SUPPORTED_VERSION {
            return Err(ConfigError::range_with_hint(
                "version",
                file.version,
                SUPPORTED_VERSION,
                SUPPORTED_VERSION,
                "Only schema version 1 is supported",
            ));
        }

        let base = SolverConfig::from_preset(file.preset);
        let config = match file.overrides {
            Some(overrides) => overrides.apply(base),
            None => base,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a v1 YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize as a v1 document with every field spelled out
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: SUPPORTED_VERSION,
            preset: Preset::Balanced,
            overrides: Some(SolverOverrides::full(self)),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
