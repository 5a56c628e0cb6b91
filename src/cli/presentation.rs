//! CLI presentation: text and json formatters per command family.

mod generation;
mod markers;

pub use generation::{
    format_check_report_json, format_check_report_text, format_generation_report_json,
    format_generation_report_text,
};
pub use markers::{format_markers_json, format_markers_text};

use crate::error::GeneratorError;
use serde::Serialize;

fn to_json<T: Serialize>(value: &T) -> Result<String, GeneratorError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| GeneratorError::Render(format!("Failed to serialize report: {}", e)))
}
