//! Atomic replace of the destination artifact.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use varigen::emit::{emit_artifact, write_atomic_with};

fn leftover_temp_files(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn test_concurrent_reader_sees_only_complete_artifacts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("variant.hpp");

    let small = "a".repeat(64 * 1024) + "\n";
    let large = "b".repeat(512 * 1024) + "\n";
    emit_artifact(&path, &small).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let done = Arc::clone(&done);
        let path = path.clone();
        let (small, large) = (small.clone(), large.clone());
        thread::spawn(move || {
            let mut reads = 0usize;
            loop {
                let finished = done.load(Ordering::SeqCst);
                let seen = std::fs::read_to_string(&path).unwrap();
                assert!(
                    seen == small || seen == large,
                    "observed a partial artifact of {} bytes",
                    seen.len()
                );
                reads += 1;
                if finished {
                    return reads;
                }
            }
        })
    };

    for i in 0..40 {
        let contents = if i % 2 == 0 { &large } else { &small };
        emit_artifact(&path, contents).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn test_failed_write_keeps_previous_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("variant.hpp");
    emit_artifact(&path, "previous\n").unwrap();

    let result = write_atomic_with(&path, |file| {
        use std::io::Write;
        file.write_all(b"half of the new arti")?;
        Err(std::io::Error::new(std::io::ErrorKind::Other, "interrupted"))
    });

    assert_eq!(result.unwrap_err().kind(), "IOFailure");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous\n");
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn test_emit_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("include").join("nonstd").join("variant.hpp");

    let outcome = emit_artifact(&path, "x\n").unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.bytes_written, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
}
