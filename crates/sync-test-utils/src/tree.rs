//! Input artifact directories.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A temporary directory holding `files` (`(relative path, content)` pairs).
pub fn input_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);
    dir
}

/// Write `files` below `root`, creating parent directories.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_files: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("write_files: failed to write {}: {e}", path.display()));
    }
}

/// Replace the whole contents of `root` with `files`.
pub fn reset_files(root: &Path, files: &[(&str, &str)]) {
    for entry in fs::read_dir(root).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
    }
    write_files(root, files);
}
