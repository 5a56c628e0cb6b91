//! Axis enumeration
//!
//! Each axis is an explicit, ordered enumeration independent of any text
//! processing. Orders are fixed: ascending indices, and for the inner
//! selection cross product lexicographic with argument position 1 varying
//! slowest and position `a` fastest.

use crate::error::GeneratorError;
use crate::params::GenerationParameters;
use serde::Serialize;

/// Axis a marker varies over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// One instantiation per alternative `k` in `1..=N`.
    Single,
    /// One instantiation per visitor arity `a` in `0..=M`.
    Paired,
}

impl AxisKind {
    /// Interpret the axis name written in a skeleton declaration.
    pub fn parse(marker: &str, declared: &str) -> Result<Self, GeneratorError> {
        match declared {
            "single" => Ok(AxisKind::Single),
            "paired" => Ok(AxisKind::Paired),
            other => Err(GeneratorError::marker(
                marker,
                format!("unrecognized axis kind '{}' (expected 'single' or 'paired')", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AxisKind::Single => "single",
            AxisKind::Paired => "paired",
        }
    }

    /// Name of the variable the axis binds in fragments.
    pub fn variable(&self) -> &'static str {
        match self {
            AxisKind::Single => "k",
            AxisKind::Paired => "a",
        }
    }

    /// Ordered axis values for the given parameters.
    pub fn values(&self, params: &GenerationParameters) -> Vec<usize> {
        match self {
            AxisKind::Single => single_axis(params),
            AxisKind::Paired => paired_axis(params),
        }
    }
}

impl std::fmt::Display for AxisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substituted index of one instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum AxisIndex {
    Single { k: usize },
    Paired { arity: usize },
}

impl AxisIndex {
    pub fn new(kind: AxisKind, value: usize) -> Self {
        match kind {
            AxisKind::Single => AxisIndex::Single { k: value },
            AxisKind::Paired => AxisIndex::Paired { arity: value },
        }
    }

    pub fn value(&self) -> usize {
        match self {
            AxisIndex::Single { k } => *k,
            AxisIndex::Paired { arity } => *arity,
        }
    }
}

impl std::fmt::Display for AxisIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisIndex::Single { k } => write!(f, "k={}", k),
            AxisIndex::Paired { arity } => write!(f, "a={}", arity),
        }
    }
}

/// `1..=N`, strictly ascending.
pub fn single_axis(params: &GenerationParameters) -> Vec<usize> {
    (1..=params.type_count()).collect()
}

/// `0..=M`, strictly ascending.
pub fn paired_axis(params: &GenerationParameters) -> Vec<usize> {
    (0..=params.visitor_arity()).collect()
}

/// Number of selections for `arity` positions over `type_count` alternatives,
/// or `None` on overflow.
pub fn selection_count(type_count: usize, arity: usize) -> Option<usize> {
    let exp = u32::try_from(arity).ok()?;
    type_count.checked_pow(exp)
}

/// Every selection `(s[1], .., s[arity])` with each `s[j]` in `1..=type_count`.
///
/// Lexicographic, position 1 slowest. Arity 0 yields exactly one empty
/// selection; `type_count == 0` with a positive arity yields none.
pub fn selections(type_count: usize, arity: usize) -> Selections {
    let first = if arity > 0 && type_count == 0 {
        None
    } else {
        Some(vec![1; arity])
    };
    Selections {
        type_count,
        next: first,
    }
}

/// Iterator returned by [`selections`].
#[derive(Debug, Clone)]
pub struct Selections {
    type_count: usize,
    next: Option<Vec<usize>>,
}

impl Iterator for Selections {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut successor = current.clone();
        let mut position = successor.len();
        while position > 0 {
            position -= 1;
            if successor[position] < self.type_count {
                successor[position] += 1;
                self.next = Some(successor);
                break;
            }
            successor[position] = 1;
        }

        Some(current)
    }
}
