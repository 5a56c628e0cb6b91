//! Config loader: assembles the layered sources and deserializes the result.

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::VarigenConfig;
use crate::error::GeneratorError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace file and environment.
    pub fn load(workspace_root: &Path) -> Result<VarigenConfig, GeneratorError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: VarigenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load defaults, one explicit file (which must exist) and environment.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<VarigenConfig, GeneratorError> {
        let path = path.as_ref();
        let builder = builder_with_defaults()?.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: VarigenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(config = %path.display(), "Configuration loaded from explicit file");
        Ok(config)
    }
}
