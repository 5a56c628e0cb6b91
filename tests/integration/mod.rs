//! Integration tests for the variant header generator

mod atomic_emit;
mod bundled_skeleton;
mod cli_commands;
mod config_integration;
mod test_utils;

pub use test_utils::{bundled_skeleton_path, with_isolated_env, write_skeleton};
