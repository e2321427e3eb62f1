//! Version-control capability used by the sync workflow

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use sync_fs::RepoRelativePath;

use crate::Result;

/// Opaque commit identifier (full hex object id for git).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(7).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A branch as seen in the local reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    pub name: String,
    /// Tip commit, `None` when the branch does not exist.
    pub tip: Option<CommitId>,
}

impl BranchState {
    pub fn existing(name: impl Into<String>, tip: CommitId) -> Self {
        Self {
            name: name.into(),
            tip: Some(tip),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tip: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.tip.is_some()
    }
}

/// Author identity and time recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSignature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

/// Staged changes relative to the checked-out commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl StatusSummary {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// The operations the sync workflow performs against a destination repository.
///
/// A backend holds at most one working copy, created by [`clone_branch`].
/// Every other method operates on that copy and fails with
/// [`Error::NotCloned`](crate::Error::NotCloned) before it exists.
///
/// [`clone_branch`]: VcsBackend::clone_branch
pub trait VcsBackend {
    /// Clone `url` with only `branch` checked out.
    fn clone_branch(&mut self, url: &str, branch: &str) -> Result<()>;

    /// Fetch `branch` from the remote into the local branch of the same name.
    ///
    /// Returns [`Error::FetchUpToDate`](crate::Error::FetchUpToDate) or
    /// [`Error::NoMatchingRemoteRef`](crate::Error::NoMatchingRemoteRef) when
    /// there is nothing to fetch; see [`Error::is_benign_fetch`](crate::Error::is_benign_fetch).
    fn fetch_branch(&mut self, branch: &str) -> Result<()>;

    /// Look up a local branch.
    fn branch_state(&self, branch: &str) -> Result<BranchState>;

    /// Check out `branch`.
    ///
    /// With `create_from` set, the branch is created at that commit first;
    /// otherwise it must already exist.
    fn checkout(&mut self, branch: &str, create_from: Option<&CommitId>) -> Result<()>;

    /// Root of the working copy.
    fn worktree(&self) -> Result<&Path>;

    /// Stage additions, modifications and deletions at or below `path`.
    fn stage(&mut self, path: &RepoRelativePath) -> Result<()>;

    /// Summarize what is staged.
    fn status(&self) -> Result<StatusSummary>;

    /// Commit the staged tree on top of the checked-out commit.
    ///
    /// Does not move any reference; see [`set_reference`](VcsBackend::set_reference).
    fn commit(&mut self, message: &str, author: &AuthorSignature) -> Result<CommitId>;

    /// Point the local branch at `id`.
    fn set_reference(&mut self, branch: &str, id: &CommitId) -> Result<()>;

    /// Push the local branch to the remote branch of the same name.
    fn push(&mut self, branch: &str, force: bool) -> Result<()>;
}
