//! Configuration System
//!
//! Layered configuration for generation defaults and logging. Precedence,
//! lowest first: built-in defaults, global config file, workspace
//! `varigen.toml`, `VARIGEN_*` environment variables, then CLI flags applied
//! by the caller. Values here are raw input: generation parameters still go
//! through the parameter resolver.

use crate::error::GeneratorError;
use crate::expand::DEFAULT_MAX_INSTANTIATIONS;
use crate::generation::GenerateOptions;
use crate::logging::LoggingConfig;
use crate::params::{DEFAULT_TYPE_COUNT, DEFAULT_VISITOR_ARITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarigenConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of alternative types
    #[serde(default = "default_max_types")]
    pub max_types: i64,

    /// Maximum number of `visit` arguments
    #[serde(default = "default_max_args")]
    pub max_args: i64,

    /// Skeleton path, relative to the workspace root
    #[serde(default = "default_skeleton")]
    pub skeleton: PathBuf,

    /// Artifact path, relative to the workspace root
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_true")]
    pub trailing_newline: bool,

    /// Iteration budget of any single fragment loop
    #[serde(default = "default_max_instantiations")]
    pub max_instantiations: usize,
}

fn default_max_types() -> i64 {
    DEFAULT_TYPE_COUNT
}

fn default_max_args() -> i64 {
    DEFAULT_VISITOR_ARITY
}

fn default_skeleton() -> PathBuf {
    PathBuf::from("template/variant.hpp")
}

fn default_output() -> PathBuf {
    PathBuf::from("include/nonstd/variant.hpp")
}

fn default_true() -> bool {
    true
}

fn default_max_instantiations() -> usize {
    DEFAULT_MAX_INSTANTIATIONS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_types: default_max_types(),
            max_args: default_max_args(),
            skeleton: default_skeleton(),
            output: default_output(),
            trailing_newline: default_true(),
            max_instantiations: default_max_instantiations(),
        }
    }
}

impl GenerationConfig {
    /// Validate settings the parameter resolver does not cover.
    pub fn validate(&self) -> Result<(), String> {
        if self.skeleton.as_os_str().is_empty() {
            return Err("Skeleton path cannot be empty".to_string());
        }
        if self.output.as_os_str().is_empty() {
            return Err("Output path cannot be empty".to_string());
        }
        if self.max_instantiations == 0 {
            return Err("max_instantiations must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            trailing_newline: self.trailing_newline,
            max_instantiations: self.max_instantiations,
        }
    }

    /// Skeleton and output paths resolved against `workspace_root`.
    pub fn resolve_paths(&self, workspace_root: &Path) -> (PathBuf, PathBuf) {
        (
            resolve_path(workspace_root, &self.skeleton),
            resolve_path(workspace_root, &self.output),
        )
    }
}

/// Join relative paths onto `root`; absolute paths are kept.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl VarigenConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        self.generation
            .validate()
            .map_err(|e| GeneratorError::Config(format!("generation: {}", e)))
    }
}
