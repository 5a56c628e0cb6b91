//! CLI parse: clap types for varigen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// varigen - generate bounded-arity variant headers from an annotated skeleton
#[derive(Parser)]
#[command(name = "varigen")]
#[command(about = "Generate a variant header supporting the given maximum number of types and visitor arguments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root; relative skeleton and output paths resolve against it
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report what is generated and log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the header and write it atomically to the output path
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Render in memory and verify the output path is up to date; never writes
    Check {
        #[command(flatten)]
        args: GenerateArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the skeleton's markers and how many instantiations each expands to
    Markers {
        #[command(flatten)]
        args: GenerateArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Report format on stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Inputs shared by every command. Unset values fall back to configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Maximum number of variant types
    #[arg(long, value_name = "TYPES", allow_negative_numbers = true)]
    pub max_types: Option<i64>,

    /// Maximum number of arguments for 'visit' methods
    #[arg(long, value_name = "ARGS", allow_negative_numbers = true)]
    pub max_args: Option<i64>,

    /// Skeleton to expand
    #[arg(long)]
    pub skeleton: Option<PathBuf>,

    /// Destination of the generated header
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Do not append a final newline to the artifact
    #[arg(long)]
    pub no_trailing_newline: bool,
}
