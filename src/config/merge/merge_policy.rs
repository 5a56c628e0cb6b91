//! Merge rules: defaults, override order, conflict handling.

use crate::expand::DEFAULT_MAX_INSTANTIATIONS;
use crate::params::{DEFAULT_TYPE_COUNT, DEFAULT_VISITOR_ARITY};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
/// Later sources override earlier ones key by key.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.max_types", DEFAULT_TYPE_COUNT)?
        .set_default("generation.max_args", DEFAULT_VISITOR_ARITY)?
        .set_default("generation.skeleton", "template/variant.hpp")?
        .set_default("generation.output", "include/nonstd/variant.hpp")?
        .set_default("generation.trailing_newline", true)?
        .set_default(
            "generation.max_instantiations",
            DEFAULT_MAX_INSTANTIATIONS as u64,
        )
}
