//! Marker table presentation.

use super::to_json;
use crate::error::GeneratorError;
use crate::generation::MarkerSummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

pub fn format_markers_text(markers: &[MarkerSummary]) -> String {
    if markers.is_empty() {
        return "Skeleton declares no markers.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Marker", "Axis", "Line", "Instantiations"]);
    for m in markers {
        table.add_row(vec![
            m.name.clone(),
            m.axis.to_string(),
            m.line.to_string(),
            m.instantiations.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_markers_json(markers: &[MarkerSummary]) -> Result<String, GeneratorError> {
    to_json(&markers)
}
