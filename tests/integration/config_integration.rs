//! Layered configuration: global file, workspace file, environment.

use std::path::PathBuf;
use tempfile::TempDir;
use varigen::config::{global_config_path, ConfigLoader, WORKSPACE_CONFIG_FILE};

use crate::integration::with_isolated_env;

#[test]
fn test_global_config_path_follows_xdg_config_home() {
    with_isolated_env(|config_home| {
        assert_eq!(
            global_config_path(),
            Some(config_home.join("varigen").join("config.toml"))
        );
    });
}

#[test]
fn test_precedence_global_workspace_environment() {
    with_isolated_env(|config_home| {
        let global_dir = config_home.join("varigen");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            "[generation]\nmax_types = 10\nmax_args = 4\noutput = \"global.hpp\"\n",
        )
        .unwrap();

        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.max_types, 10);
        assert_eq!(config.generation.max_args, 4);
        assert_eq!(config.generation.output, PathBuf::from("global.hpp"));

        std::fs::write(
            workspace.path().join(WORKSPACE_CONFIG_FILE),
            "[generation]\nmax_args = 2\n",
        )
        .unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.max_types, 10);
        assert_eq!(config.generation.max_args, 2);

        std::env::set_var("VARIGEN_GENERATION__MAX_TYPES", "6");
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.max_types, 6);
        assert_eq!(config.generation.max_args, 2);
    });
}

#[test]
fn test_config_values_are_not_validated_as_parameters() {
    // Out-of-domain values load; the parameter resolver rejects them later.
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        std::fs::write(
            workspace.path().join(WORKSPACE_CONFIG_FILE),
            "[generation]\nmax_types = 0\nmax_args = -1\n",
        )
        .unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.max_types, 0);
        assert_eq!(config.generation.max_args, -1);
    });
}

#[test]
fn test_malformed_workspace_file_is_config_error() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        std::fs::write(
            workspace.path().join(WORKSPACE_CONFIG_FILE),
            "[generation\nmax_types = ",
        )
        .unwrap();
        let err = ConfigLoader::load(workspace.path()).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    });
}
