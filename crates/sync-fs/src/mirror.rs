//! Full-replace mirroring of an input tree into a worktree
//!
//! The destination subtree is deleted and rebuilt from the input on every
//! call, so it ends up identical to the input regardless of what a previous
//! run left behind. Entries named `.git` are never copied or removed.

use std::fs;
use std::path::Path;

use crate::{Error, RepoRelativePath, Result};

const GIT_DIR: &str = ".git";

/// Counters describing what a mirror operation copied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub files: usize,
    pub directories: usize,
    pub symlinks: usize,
    pub bytes: u64,
}

/// Replace `subdir` inside `worktree` with a copy of `input`.
///
/// Intermediate directories of `subdir` are created when missing. When
/// `subdir` is the root, every top-level entry except `.git` is removed.
pub fn replace_subtree(
    input: &Path,
    worktree: &Path,
    subdir: &RepoRelativePath,
) -> Result<MirrorStats> {
    let meta = fs::metadata(input).map_err(|e| Error::io(input, e))?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory {
            path: input.to_path_buf(),
        });
    }
    let input = dunce::canonicalize(input).map_err(|e| Error::io(input, e))?;
    let target = subdir.resolve_in(worktree)?;

    if subdir.is_root() {
        clear_root(worktree)?;
    } else {
        remove_entry(&target)?;
    }
    tracing::debug!(path = %subdir, "Cleared destination subtree");

    let stats = copy_tree(&input, &target)?;
    tracing::info!(
        path = %subdir,
        files = stats.files,
        directories = stats.directories,
        symlinks = stats.symlinks,
        bytes = stats.bytes,
        "Mirrored input tree"
    );
    Ok(stats)
}

/// Recursively copy `src` into `dest`, creating `dest` if needed.
///
/// Entries are visited in name order. Symlinks are recreated rather than
/// followed on unix; elsewhere their targets are copied.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<MirrorStats> {
    let mut stats = MirrorStats::default();
    copy_dir_into(src, dest, &mut stats)?;
    Ok(stats)
}

fn copy_dir_into(src: &Path, dest: &Path, stats: &mut MirrorStats) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    for entry in sorted_entries(src)? {
        let name = entry.file_name();
        if name == GIT_DIR {
            tracing::debug!(path = %entry.path().display(), "Skipping nested git directory");
            continue;
        }

        let from = entry.path();
        let to = dest.join(&name);
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;

        if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
            stats.symlinks += 1;
        } else if file_type.is_dir() {
            copy_dir_into(&from, &to, stats)?;
            stats.directories += 1;
        } else {
            // fs::copy carries permission bits, which keeps executables executable
            stats.bytes += fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
            stats.files += 1;
        }
    }

    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn clear_root(worktree: &Path) -> Result<()> {
    for entry in sorted_entries(worktree)? {
        if entry.file_name() == GIT_DIR {
            continue;
        }
        remove_entry(&entry.path())?;
    }
    Ok(())
}

fn remove_entry(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(|e| Error::io(src, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| Error::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).map_err(|e| Error::io(src, e))?;
    Ok(())
}
