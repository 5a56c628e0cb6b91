//! CLI route: single route table and run context. Dispatches to the
//! generation entry points and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, GenerateArgs, OutputFormat};
use crate::cli::presentation::{
    format_check_report_json, format_check_report_text, format_generation_report_json,
    format_generation_report_text, format_markers_json, format_markers_text,
};
use crate::config::{resolve_path, ConfigLoader, VarigenConfig};
use crate::error::GeneratorError;
use crate::generation::{run_check, run_generate, run_markers, GenerateRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};

/// Text for stdout plus whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: VarigenConfig,
    verbose: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, GeneratorError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(resolve_path(&workspace_root, path))?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    /// Create run context from an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: VarigenConfig) -> Self {
        Self {
            workspace_root,
            config,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &VarigenConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, GeneratorError> {
        let span = info_span!("command", name = command_name(command));
        let _guard = span.enter();

        match command {
            Commands::Generate { args, format } => {
                let request = self.build_request(args);
                let report = run_generate(&request)?;
                let text = match format {
                    OutputFormat::Json => format_generation_report_json(&report)?,
                    OutputFormat::Text => format_generation_report_text(&report, self.verbose),
                };
                Ok(CommandOutput::ok(text))
            }
            Commands::Check { args, format } => {
                let request = self.build_request(args);
                let report = run_check(&request)?;
                let text = match format {
                    OutputFormat::Json => format_check_report_json(&report)?,
                    OutputFormat::Text => format_check_report_text(&report),
                };
                Ok(CommandOutput {
                    text,
                    success: report.up_to_date,
                })
            }
            Commands::Markers { args, format } => {
                let request = self.build_request(args);
                let markers = run_markers(&request)?;
                let text = match format {
                    OutputFormat::Json => format_markers_json(&markers)?,
                    OutputFormat::Text => format_markers_text(&markers),
                };
                Ok(CommandOutput::ok(text))
            }
        }
    }

    /// Merge CLI flags over configuration. Flags win; paths resolve against
    /// the workspace root.
    pub fn build_request(&self, args: &GenerateArgs) -> GenerateRequest {
        let generation = &self.config.generation;
        let skeleton = args.skeleton.as_ref().unwrap_or(&generation.skeleton);
        let output = args.output.as_ref().unwrap_or(&generation.output);

        let mut options = generation.options();
        if args.no_trailing_newline {
            options.trailing_newline = false;
        }

        let request = GenerateRequest {
            skeleton: resolve_path(&self.workspace_root, skeleton),
            output: resolve_path(&self.workspace_root, output),
            type_count: Some(args.max_types.unwrap_or(generation.max_types)),
            visitor_arity: Some(args.max_args.unwrap_or(generation.max_args)),
            options,
        };
        debug!(?request, "Request built");
        request
    }
}
