//! Configuration errors

use thiserror::Error;

/// Everything that can go wrong while building or loading a `SolverConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting outside its accepted range
    #[error("{field} = {value} is outside {min}..={max} ({hint})")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    #[error("no preset named '{0}' (expected fast, balanced or thorough)")]
    UnknownPreset(String),

    /// Settings that are individually valid but contradict each other
    #[error("conflicting settings: {issue}; {fix}")]
    Conflict { issue: String, fix: String },

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Range error for `field`, with a hint on how to fix it
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    pub fn conflict(issue: impl Into<String>, fix: impl Into<String>) -> Self {
        Self::Conflict {
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}
