//! Shared test utilities for integration tests
//!
//! Provides isolated configuration environments and skeleton fixtures.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that touch process-wide environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "VARIGEN_GENERATION__MAX_TYPES",
    "VARIGEN_GENERATION__MAX_ARGS",
    "VARIGEN_GENERATION__OUTPUT",
];

/// Environment variable state to restore after test
struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            saved: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.saved {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into a fresh temp dir and
/// every `VARIGEN_GENERATION__*` variable cleared. The config home is passed
/// to `f`; the environment is restored afterwards, even on panic.
pub fn with_isolated_env<F, R>(f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let state = EnvState::capture();

    let temp_dir = TempDir::new().unwrap();
    let config_home = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_home).unwrap();
    std::env::set_var("HOME", temp_dir.path());
    std::env::set_var("XDG_CONFIG_HOME", &config_home);
    for name in &ISOLATED_VARS[2..] {
        std::env::remove_var(name);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&config_home)));
    state.restore();
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// The skeleton shipped with the crate.
pub fn bundled_skeleton_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("template")
        .join("variant.hpp")
}

/// Write `text` as `name` under `dir` and return its path.
pub fn write_skeleton(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, text).unwrap();
    path
}
