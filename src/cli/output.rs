//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::GeneratorError;

/// Map domain errors to a single line for stderr, prefixed by the stable
/// failure kind.
pub fn map_error(e: &GeneratorError) -> String {
    format!("error[{}]: {}", e.kind(), e)
}
