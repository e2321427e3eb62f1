//! Filesystem primitives for artifact-sync
//!
//! Provides confined destination paths, full-replace mirroring of an input
//! tree into a worktree subdirectory.

pub mod error;
pub mod mirror;
pub mod path;

pub use error::{Error, Result};
pub use mirror::{MirrorStats, copy_tree, replace_subtree};
pub use path::RepoRelativePath;
