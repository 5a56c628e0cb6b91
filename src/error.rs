//! Error types for the variant header generator.

use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds of a generation run.
///
/// Every failure is surfaced to the immediate caller; the generator never
/// retries, since identical inputs reproduce identical failures.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A generation parameter is outside its valid domain.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    /// The skeleton declares a construct the expander cannot interpret.
    #[error("Marker '{marker}' cannot be expanded: {reason}")]
    MarkerExpansion { marker: String, reason: String },

    /// Expander output and skeleton markers disagree. Always a bug.
    #[error("Render failed: {0}")]
    Render(String),

    /// Reading the skeleton or writing the artifact failed.
    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GeneratorError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn marker(marker: impl Into<String>, reason: impl Into<String>) -> Self {
        GeneratorError::MarkerExpansion {
            marker: marker.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable short name of the failure kind, used by the CLI surface.
    pub fn kind(&self) -> &'static str {
        match self {
            GeneratorError::InvalidParameter { .. } => "InvalidParameter",
            GeneratorError::MarkerExpansion { .. } => "MarkerExpansionError",
            GeneratorError::Render(_) => "RenderError",
            GeneratorError::Io { .. } => "IOFailure",
            GeneratorError::Config(_) => "ConfigError",
        }
    }
}

impl From<config::ConfigError> for GeneratorError {
    fn from(err: config::ConfigError) -> Self {
        GeneratorError::Config(err.to_string())
    }
}
