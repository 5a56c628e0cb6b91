//! Generation presentation: generate and check reports.

use super::markers::format_markers_text;
use super::to_json;
use crate::error::GeneratorError;
use crate::generation::{CheckReport, GenerationReport};

pub fn format_generation_report_text(report: &GenerationReport, verbose: bool) -> String {
    let mut s = format!(
        "Generated '{}' with max {} types, max {} visitor arguments from '{}'",
        report.destination.display(),
        report.params.type_count(),
        report.params.visitor_arity(),
        report.skeleton.display()
    );
    s.push_str(&format!(
        "\n  Markers: {}\n  Instantiations: {}\n  Bytes: {}\n  Digest: {}\n  Changed: {}",
        report.markers.len(),
        report.instantiations,
        report.bytes,
        report.digest,
        if report.changed { "yes" } else { "no (identical content)" }
    ));
    if verbose {
        s.push('\n');
        s.push_str(&format_markers_text(&report.markers));
    }
    s
}

pub fn format_generation_report_json(report: &GenerationReport) -> Result<String, GeneratorError> {
    to_json(report)
}

pub fn format_check_report_text(report: &CheckReport) -> String {
    match (&report.actual_digest, report.up_to_date) {
        (_, true) => format!(
            "Up to date: '{}' ({})",
            report.destination.display(),
            report.expected_digest
        ),
        (None, false) => format!(
            "Missing: '{}' does not exist; run `varigen generate`",
            report.destination.display()
        ),
        (Some(actual), false) => format!(
            "Stale: '{}'\n  Expected: {}\n  Found:    {}\n  Run `varigen generate` to update it",
            report.destination.display(),
            report.expected_digest,
            actual
        ),
    }
}

pub fn format_check_report_json(report: &CheckReport) -> Result<String, GeneratorError> {
    to_json(report)
}
