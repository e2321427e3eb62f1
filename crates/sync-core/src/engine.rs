//! Destination branch synchronization
//!
//! [`SyncEngine::sync`] runs the fixed phase sequence against a
//! [`VcsBackend`]: clone the base branch, fetch the head branch if the remote
//! has it, check the head out (reusing or creating it), replace the
//! destination subtree with the input, commit, and force-push.
//!
//! Any failure stops the run. Nothing is retried or rolled back.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use sync_git::{AuthorSignature, BranchState, StatusSummary, VcsBackend};
use sync_host::User;

use crate::config::SyncRequest;
use crate::identity::mask_url;
use crate::{Error, Result};

/// Name and email the sync commit is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
}

impl AuthorIdentity {
    /// The host account's login and public email, or its noreply address
    /// when the email is hidden.
    pub fn for_user(user: &User) -> Self {
        let email = user
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@users.noreply.github.com", user.login));
        Self {
            name: user.login.clone(),
            email,
        }
    }
}

/// The commit a sync produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// Counts of staged changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl From<&StatusSummary> for ChangeSummary {
    fn from(status: &StatusSummary) -> Self {
        Self {
            added: status.added.len(),
            modified: status.modified.len(),
            deleted: status.deleted.len(),
        }
    }
}

/// What [`SyncEngine::sync`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Head branch before this run, as fetched from the remote
    pub head_before: BranchState,
    pub commit: CommitResult,
    pub changes: ChangeSummary,
}

impl SyncOutcome {
    /// The head branch was created from the base in this run.
    pub fn created(&self) -> bool {
        !self.head_before.exists()
    }
}

/// Runs the synchronization phases against one backend.
pub struct SyncEngine<B> {
    backend: B,
}

impl<B: VcsBackend> SyncEngine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Publish the request's input tree to its head branch.
    pub fn sync(&mut self, request: &SyncRequest, author: &AuthorIdentity) -> Result<SyncOutcome> {
        let base = request.base();
        let head = request.head();
        let url = mask_url(request.repo_url());

        tracing::info!(url = %url, branch = base, "Cloning destination repository");
        self.backend
            .clone_branch(request.repo_url(), base)
            .map_err(|e| Error::from_git(format!("clone {url} at '{base}'"), e))?;

        tracing::info!(branch = head, "Fetching head branch");
        match self.backend.fetch_branch(head) {
            Ok(()) => {}
            Err(e) if e.is_benign_fetch() => tracing::debug!(branch = head, "{e}"),
            Err(e) => return Err(Error::network(format!("fetch head branch '{head}'"), e)),
        }

        let base_state = self
            .backend
            .branch_state(base)
            .map_err(|e| Error::from_git(format!("resolve base branch '{base}'"), e))?;
        let Some(base_tip) = base_state.tip else {
            return Err(Error::git_state(
                format!("resolve base branch '{base}'"),
                "branch not found, check your inputs",
            ));
        };

        let head_before = self
            .backend
            .branch_state(head)
            .map_err(|e| Error::from_git(format!("resolve head branch '{head}'"), e))?;
        let checkout = match &head_before.tip {
            Some(tip) => {
                tracing::info!(branch = head, commit = tip.short(), "Reusing existing head branch");
                self.backend.checkout(head, None)
            }
            None => {
                tracing::info!(branch = head, base, commit = base_tip.short(), "Creating head branch");
                self.backend.checkout(head, Some(&base_tip))
            }
        };
        checkout.map_err(|e| Error::git_state(format!("check out '{head}'"), e))?;

        let subdir = request.subdir();
        let worktree = self
            .backend
            .worktree()
            .map_err(|e| Error::from_git("locate worktree", e))?
            .to_path_buf();
        sync_fs::replace_subtree(request.input_path(), &worktree, subdir).map_err(|e| {
            Error::fs(
                format!("mirror {} into '{subdir}'", request.input_path().display()),
                e,
            )
        })?;
        self.backend
            .stage(subdir)
            .map_err(|e| Error::from_git(format!("stage '{subdir}'"), e))?;

        let status = self
            .backend
            .status()
            .map_err(|e| Error::from_git("summarize staged changes", e))?;
        log_status(head, &status);

        let signature = AuthorSignature {
            name: author.name.clone(),
            email: author.email.clone(),
            when: request.commit_time().resolve(),
        };
        let id = self
            .backend
            .commit(request.message(), &signature)
            .map_err(|e| Error::from_git("commit", e))?;
        self.backend
            .set_reference(head, &id)
            .map_err(|e| Error::from_git(format!("update '{head}'"), e))?;
        tracing::info!(branch = head, commit = id.short(), "Committed");

        tracing::info!(url = %url, branch = head, "Force-pushing head branch");
        self.backend
            .push(head, true)
            .map_err(|e| Error::network(format!("push '{head}' to {url}"), e))?;

        Ok(SyncOutcome {
            head_before,
            commit: CommitResult {
                id: id.to_string(),
                author_name: signature.name,
                author_email: signature.email,
                timestamp: signature.when,
            },
            changes: ChangeSummary::from(&status),
        })
    }
}

fn log_status(branch: &str, status: &StatusSummary) {
    if status.is_clean() {
        tracing::info!(branch, "No changes to the destination; committing anyway");
        return;
    }
    tracing::info!(
        branch,
        added = status.added.len(),
        modified = status.modified.len(),
        deleted = status.deleted.len(),
        "Staged changes"
    );
    for path in &status.added {
        tracing::debug!(path = %path, "added");
    }
    for path in &status.modified {
        tracing::debug!(path = %path, "modified");
    }
    for path in &status.deleted {
        tracing::debug!(path = %path, "deleted");
    }
}
