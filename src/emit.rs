//! Emitter
//!
//! Persists the artifact with a single atomic replace: the bytes go to a
//! uniquely named temporary file beside the destination, which is synced and
//! then renamed over the destination. Readers see either the previous
//! complete artifact or the new one.

use crate::error::GeneratorError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Outcome of an emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOutcome {
    pub bytes_written: usize,
    /// False when the destination already held identical content.
    pub changed: bool,
}

/// Atomically replace `path` with `contents`.
pub fn emit_artifact<P: AsRef<Path>>(path: P, contents: &str) -> Result<EmitOutcome, GeneratorError> {
    let path = path.as_ref();
    let changed = match fs::read(path) {
        Ok(existing) => existing != contents.as_bytes(),
        Err(_) => true,
    };

    write_atomic_with(path, |file| file.write_all(contents.as_bytes()))?;

    Ok(EmitOutcome {
        bytes_written: contents.len(),
        changed,
    })
}

/// Atomically replace `path` with whatever `write` produces.
///
/// If `write` fails, nothing is renamed and the temporary file is removed;
/// the destination keeps its previous content.
pub fn write_atomic_with<P, F>(path: P, write: F) -> Result<(), GeneratorError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            GeneratorError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "destination has no file name"),
            )
        })?;

    let mut temp = Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| GeneratorError::io(parent, e))?;

    // The temporary file is deleted on drop if anything below fails.
    write(&mut temp).map_err(|e| GeneratorError::io(temp.path(), e))?;
    temp.flush().map_err(|e| GeneratorError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| GeneratorError::io(temp.path(), e))?;

    let temp_path = temp.path().to_path_buf();
    temp.persist(path)
        .map_err(|e| GeneratorError::io(path, e.error))?;

    debug!(
        destination = %path.display(),
        temp = %temp_path.display(),
        "Artifact persisted"
    );
    Ok(())
}
