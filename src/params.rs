//! Parameter Resolver
//!
//! Validates and normalizes the two generation parameters: the maximum number
//! of alternative types a variant supports and the maximum number of variant
//! arguments accepted by `visit`.

use crate::error::GeneratorError;
use serde::Serialize;

/// Default maximum number of alternative types.
pub const DEFAULT_TYPE_COUNT: i64 = 16;

/// Default maximum number of visitor arguments.
pub const DEFAULT_VISITOR_ARITY: i64 = 5;

/// Hard cap on the type-count axis.
pub const MAX_TYPE_COUNT: usize = 64;

/// Hard cap on the visitor-arity axis.
pub const MAX_VISITOR_ARITY: usize = 8;

/// Resolved, validated generation parameters. Immutable once constructed;
/// the only way in is [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GenerationParameters {
    type_count: usize,
    visitor_arity: usize,
}

impl GenerationParameters {
    /// Validate explicit values. Same rules as [`resolve`], without defaults.
    pub fn new(type_count: i64, visitor_arity: i64) -> Result<Self, GeneratorError> {
        resolve(Some(type_count), Some(visitor_arity))
    }

    /// Maximum alternative-type count `N` (at least 1).
    pub fn type_count(&self) -> usize {
        self.type_count
    }

    /// Maximum visitor arity `M` (at least 0).
    pub fn visitor_arity(&self) -> usize {
        self.visitor_arity
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            type_count: DEFAULT_TYPE_COUNT as usize,
            visitor_arity: DEFAULT_VISITOR_ARITY as usize,
        }
    }
}

impl std::fmt::Display for GenerationParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} types, {} visitor arguments",
            self.type_count, self.visitor_arity
        )
    }
}

/// Resolve raw, possibly absent values into validated parameters.
///
/// Absent values take [`DEFAULT_TYPE_COUNT`] and [`DEFAULT_VISITOR_ARITY`].
/// Inputs are signed so that negative values coming from a caller are
/// reported as `InvalidParameter` rather than rejected by a parser.
pub fn resolve(
    type_count: Option<i64>,
    visitor_arity: Option<i64>,
) -> Result<GenerationParameters, GeneratorError> {
    let type_count = type_count.unwrap_or(DEFAULT_TYPE_COUNT);
    let visitor_arity = visitor_arity.unwrap_or(DEFAULT_VISITOR_ARITY);

    if type_count < 1 {
        return Err(GeneratorError::invalid(
            "type_count",
            format!("must be at least 1, got {}", type_count),
        ));
    }
    if type_count > MAX_TYPE_COUNT as i64 {
        return Err(GeneratorError::invalid(
            "type_count",
            format!("must not exceed {}, got {}", MAX_TYPE_COUNT, type_count),
        ));
    }
    if visitor_arity < 0 {
        return Err(GeneratorError::invalid(
            "visitor_arity",
            format!("must not be negative, got {}", visitor_arity),
        ));
    }
    if visitor_arity > MAX_VISITOR_ARITY as i64 {
        return Err(GeneratorError::invalid(
            "visitor_arity",
            format!(
                "must not exceed {}, got {}",
                MAX_VISITOR_ARITY, visitor_arity
            ),
        ));
    }

    Ok(GenerationParameters {
        type_count: type_count as usize,
        visitor_arity: visitor_arity as usize,
    })
}
