//! Repository-relative destination paths
//!
//! A [`RepoRelativePath`] names a directory inside a worktree using forward
//! slashes, the form git pathspecs expect. Construction rejects anything that
//! could reach outside the worktree or into the git database.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A validated, forward-slash path relative to a worktree root.
///
/// The empty path denotes the worktree root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RepoRelativePath {
    inner: String,
}

impl RepoRelativePath {
    /// Parse a user-supplied subdirectory.
    ///
    /// `""`, `"."` and `"./"` all resolve to the root. Backslashes are treated
    /// as separators, empty and `.` segments are dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.replace('\\', "/");
        let escape = || Error::PathEscape {
            path: raw.to_string(),
        };

        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(escape());
        }

        let mut parts = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(escape()),
                s => parts.push(s),
            }
        }

        if parts.first().is_some_and(|first| *first == ".git") {
            return Err(escape());
        }

        Ok(Self {
            inner: parts.join("/"),
        })
    }

    /// The worktree root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Pathspec matching everything at or below this path.
    pub fn pathspec(&self) -> &str {
        if self.is_root() { "*" } else { &self.inner }
    }

    /// Resolve against `base`, refusing to pass through existing symlinks.
    ///
    /// Components that do not exist yet are accepted; they will be created
    /// as plain directories by the mirror.
    pub fn resolve_in(&self, base: &Path) -> Result<PathBuf> {
        let mut current = base.to_path_buf();
        for segment in self.inner.split('/').filter(|s| !s.is_empty()) {
            current.push(segment);
            match std::fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(Error::SymlinkInPath { path: current });
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&current, e)),
            }
        }
        Ok(current)
    }
}

impl fmt::Display for RepoRelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.inner)
        }
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}
