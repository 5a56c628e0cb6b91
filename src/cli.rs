//! CLI domain: parse, route, help, output, and presentation only.
//! No generation logic; a single route table dispatches to the generation
//! entry points.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, GenerateArgs, OutputFormat};
pub use presentation::{
    format_check_report_json, format_check_report_text, format_generation_report_json,
    format_generation_report_text, format_markers_json, format_markers_text,
};
pub use route::{CommandOutput, RunContext};
