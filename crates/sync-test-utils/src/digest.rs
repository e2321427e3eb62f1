//! SHA-256 digests of directory trees
//!
//! The digest covers what git can represent: file paths, contents, the
//! executable bit and symlink targets. Empty directories and `.git` are
//! ignored, so an input tree and its committed mirror digest identically.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// `sha256:<hex>` digest of every file and symlink below `root`.
///
/// # Panics
/// On any I/O error.
pub fn tree_digest(root: &Path) -> String {
    let mut hasher = Sha256::new();
    hash_dir(root, "", &mut hasher);
    format!("sha256:{:x}", hasher.finalize())
}

fn hash_dir(dir: &Path, prefix: &str, hasher: &mut Sha256) {
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .unwrap_or_else(|e| panic!("tree_digest: read {}: {e}", dir.display()));
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }
        let name = name.to_string_lossy();
        let rel = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        let file_type = entry.file_type().unwrap();

        if file_type.is_dir() {
            hash_dir(&path, &rel, hasher);
        } else if file_type.is_symlink() {
            let target = fs::read_link(&path).unwrap();
            hasher.update(b"L");
            hasher.update(rel.as_bytes());
            hasher.update([0]);
            hasher.update(target.to_string_lossy().as_bytes());
            hasher.update([0]);
        } else {
            let content = fs::read(&path).unwrap();
            hasher.update(if is_executable(&path) { b"X" } else { b"F" });
            hasher.update(rel.as_bytes());
            hasher.update([0]);
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(&content);
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
