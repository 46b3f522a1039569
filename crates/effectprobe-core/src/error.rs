//! Error types for effectprobe-core
//!
//! Contradictory predictions are not errors: they surface as
//! [`Effect::NotComparable`](crate::effect::Effect::NotComparable). The
//! variants here are precondition violations and collaborator failures that
//! abort the current operation.

use std::fmt::Write;

use thiserror::Error;

use crate::parameter::ParamId;
use crate::value::ValueKind;

/// Actionable guidance for resolving an error
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Remediation {
    /// One-line summary of how to fix the issue
    pub summary: String,
    /// Additional alternative guidance
    pub alternatives: Vec<String>,
}

impl Remediation {
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives.push(alternative.into());
        self
    }

    /// Render remediation text for human-readable output
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "To fix:");
        let _ = writeln!(output, "  {}", self.summary);
        if !self.alternatives.is_empty() {
            let _ = writeln!(output, "  Alternatives:");
            for alt in &self.alternatives {
                let _ = writeln!(output, "    - {alt}");
            }
        }
        output
    }
}

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by an external execution driver for a single test.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main error type for effectprobe-core
#[derive(Error, Debug)]
pub enum Error {
    /// A builder was handed zero parameter domains
    #[error("no parameter domains to cover")]
    NoDomains,

    /// A parameter domain had no candidate values
    #[error("parameter domain {index} is empty")]
    EmptyDomain { index: usize },

    /// A lookup named a parameter the tree or store does not know
    #[error("unknown parameter: {id}")]
    UnknownParameter { id: ParamId },

    /// A value of the wrong kind was offered for a parameter
    #[error("type mismatch for {id}: expected {expected}, found {found}")]
    TypeMismatch {
        id: ParamId,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A per-component effect list did not match the parameter's arity
    #[error("{id} has {expected} component(s), got {found} effect(s)")]
    ComponentCount {
        id: ParamId,
        expected: usize,
        found: usize,
    },

    /// The pairwise builder gave up resampling a row
    #[error("row sampling exceeded {attempts} attempts with {uncovered} interaction(s) uncovered")]
    ResampleLimit { attempts: u64, uncovered: usize },

    /// The constraint-aware builder had nothing left to grow a configuration from.
    ///
    /// Unreachable for non-empty domains: some unused cross-domain pair or
    /// finished configuration always supplies a missing domain.
    #[error("configuration growth stalled with {remaining} domain(s) unassigned")]
    Stalled { remaining: usize },

    /// The execution driver failed on a test
    #[error("execution of test {index} failed: {source}")]
    Execution {
        index: usize,
        #[source]
        source: DriverError,
    },

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Return remediation guidance when available.
    #[must_use]
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::NoDomains => Some(
                Remediation::new("Select at least one testable parameter before planning.")
                    .alternative("Declare an expected effect for a parameter to select it."),
            ),
            Self::EmptyDomain { .. } => Some(Remediation::new(
                "Give every selected parameter at least one candidate value.",
            )),
            Self::UnknownParameter { .. } => Some(
                Remediation::new("Check that the parameter identifier exists in the pipeline.")
                    .alternative("Rebuild the testable tree after changing the pipeline."),
            ),
            Self::TypeMismatch { .. } | Self::ComponentCount { .. } => Some(Remediation::new(
                "Match the value kind and component count declared by the parameter.",
            )),
            Self::ResampleLimit { .. } => Some(
                Remediation::new("Raise covering.max_resamples or change covering.seed.")
                    .alternative("Reduce the number of candidate values per parameter."),
            ),
            Self::Stalled { .. } => Some(Remediation::new(
                "Use the pairwise strategy or relax the declared expected effects.",
            )),
            Self::Execution { .. } => Some(Remediation::new(
                "Inspect the execution driver output for the failing test and rerun.",
            )),
            Self::Config(_) => Some(
                Remediation::new("Fix the configuration file and retry.")
                    .alternative("Remove the offending key to fall back to its default."),
            ),
            Self::Io(_) => Some(Remediation::new(
                "Check filesystem permissions and paths, then retry.",
            )),
            Self::Json(_) => Some(
                Remediation::new("Validate the JSON input and retry.")
                    .alternative("Check for trailing commas or invalid UTF-8."),
            ),
        }
    }
}
