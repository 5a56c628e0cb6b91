//! Renderer
//!
//! Substitutes every marker placement in the skeleton with the concatenation
//! of its instantiations, copying verbatim text unchanged and keeping the
//! skeleton's order.

use crate::error::GeneratorError;
use crate::expand::Expansion;
use crate::skeleton::{ParameterRef, Segment, Skeleton, REFERENCE_OPEN};

/// Opening of a fragment interpolation; must never survive into an artifact.
const INTERPOLATION_OPEN: &str = "${";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append `\n` when the rendered text does not already end with one.
    pub trailing_newline: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            trailing_newline: true,
        }
    }
}

/// Render the final artifact text.
pub fn render(
    skeleton: &Skeleton,
    expansion: &Expansion,
    options: RenderOptions,
) -> Result<String, GeneratorError> {
    let mut out = String::new();

    for segment in skeleton.segments() {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Parameter(ParameterRef::TypeCount) => {
                out.push_str(&expansion.params().type_count().to_string())
            }
            Segment::Parameter(ParameterRef::VisitorArity) => {
                out.push_str(&expansion.params().visitor_arity().to_string())
            }
            Segment::Marker(name) => {
                let instantiations = expansion.get(name).ok_or_else(|| {
                    GeneratorError::Render(format!(
                        "marker '{}' has no instantiation sequence",
                        name
                    ))
                })?;
                if instantiations.is_empty() {
                    return Err(GeneratorError::Render(format!(
                        "marker '{}' expanded to zero instantiations",
                        name
                    )));
                }
                let separator = skeleton
                    .marker(name)
                    .map(|m| m.separator.as_str())
                    .unwrap_or_default();
                for (i, inst) in instantiations.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    out.push_str(&inst.text);
                }
            }
        }
    }

    if options.trailing_newline && !out.ends_with('\n') {
        out.push('\n');
    }

    for residue in [REFERENCE_OPEN, INTERPOLATION_OPEN] {
        if let Some(offset) = out.find(residue) {
            let line = out[..offset].matches('\n').count() + 1;
            return Err(GeneratorError::Render(format!(
                "placeholder syntax '{}' left in artifact at line {}",
                residue, line
            )));
        }
    }

    Ok(out)
}
