//! `git2` implementation of [`VcsBackend`]

use std::cell::RefCell;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Delta, Direction, ErrorCode, FetchOptions, IndexAddOption, Oid, PushOptions, Repository,
};
use sync_fs::RepoRelativePath;
use tempfile::TempDir;

use crate::auth::GitAuth;
use crate::backend::{AuthorSignature, BranchState, CommitId, StatusSummary, VcsBackend};
use crate::naming::head_ref;
use crate::{Error, Result};

const REMOTE: &str = "origin";

/// Shallow clone depth used unless overridden.
pub const DEFAULT_DEPTH: i32 = 1;

/// Working copy owned by the backend. `repo` is declared first so it is
/// closed before the directory is removed.
struct Checkout {
    repo: Repository,
    _dir: TempDir,
}

/// Git backend cloning into a private temporary directory.
///
/// The working copy lives as long as the backend and is deleted on drop.
pub struct Git2Backend {
    auth: GitAuth,
    depth: Option<i32>,
    checkout: Option<Checkout>,
}

impl Git2Backend {
    /// Create a backend that clones and fetches with depth 1.
    pub fn new(auth: GitAuth) -> Self {
        Self {
            auth,
            depth: Some(DEFAULT_DEPTH),
            checkout: None,
        }
    }

    /// Override the clone/fetch depth; `None` transfers full history.
    ///
    /// libgit2's local transport cannot serve shallow fetches, so remotes
    /// given as filesystem paths need `None`.
    pub fn with_depth(mut self, depth: Option<i32>) -> Self {
        self.depth = depth;
        self
    }

    /// The cloned repository, for inspection.
    pub fn repository(&self) -> Result<&Repository> {
        self.checkout
            .as_ref()
            .map(|c| &c.repo)
            .ok_or(Error::NotCloned)
    }

    fn fetch_options<'a>(&self) -> FetchOptions<'a> {
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.auth.callbacks());
        if let Some(depth) = self.depth {
            options.depth(depth);
        }
        options
    }
}

impl VcsBackend for Git2Backend {
    fn clone_branch(&mut self, url: &str, branch: &str) -> Result<()> {
        let dir = tempfile::Builder::new()
            .prefix("artifact-sync-")
            .tempdir()
            .map_err(|e| sync_fs::Error::io(std::env::temp_dir(), e))?;

        let tracked = branch.to_string();
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        builder.branch(branch);
        // Single-branch: the remote only tracks the base branch.
        builder.remote_create(move |repo, name, url| {
            let refspec = format!("+refs/heads/{tracked}:refs/remotes/{name}/{tracked}");
            repo.remote_with_fetch(name, url, &refspec)
        });

        let repo = builder.clone(url, dir.path()).map_err(|e| {
            if e.code() == ErrorCode::NotFound && e.class() == git2::ErrorClass::Reference {
                Error::RemoteBranchNotFound {
                    branch: branch.to_string(),
                }
            } else {
                Error::CloneFailed {
                    url: url.to_string(),
                    message: e.message().to_string(),
                }
            }
        })?;

        tracing::debug!(path = %dir.path().display(), "Cloned into temporary worktree");
        self.checkout = Some(Checkout { repo, _dir: dir });
        Ok(())
    }

    fn fetch_branch(&mut self, branch: &str) -> Result<()> {
        let refname = head_ref(branch);
        let fetch_failed = |e: git2::Error| Error::FetchFailed {
            branch: branch.to_string(),
            message: e.message().to_string(),
        };

        let mut options = self.fetch_options();
        let callbacks = self.auth.callbacks();
        let repo = self.repository()?;
        let mut remote = repo.find_remote(REMOTE)?;

        let remote_tip = {
            let connection = remote
                .connect_auth(Direction::Fetch, Some(callbacks), None)
                .map_err(fetch_failed)?;
            connection
                .list()
                .map_err(fetch_failed)?
                .iter()
                .find(|head| head.name() == refname)
                .map(|head| head.oid())
        };

        let Some(remote_tip) = remote_tip else {
            return Err(Error::NoMatchingRemoteRef {
                branch: branch.to_string(),
            });
        };
        if repo.refname_to_id(&refname).ok() == Some(remote_tip) {
            return Err(Error::FetchUpToDate {
                branch: branch.to_string(),
            });
        }

        let refspec = format!("+{refname}:{refname}");
        remote
            .fetch(&[&refspec], Some(&mut options), None)
            .map_err(fetch_failed)?;
        Ok(())
    }

    fn branch_state(&self, branch: &str) -> Result<BranchState> {
        let repo = self.repository()?;
        match repo.find_reference(&head_ref(branch)) {
            Ok(reference) => {
                let commit = reference.peel_to_commit()?;
                Ok(BranchState::existing(
                    branch,
                    CommitId::new(commit.id().to_string()),
                ))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(BranchState::missing(branch)),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout(&mut self, branch: &str, create_from: Option<&CommitId>) -> Result<()> {
        let repo = self.repository()?;
        let refname = head_ref(branch);
        let checkout_failed = |e: git2::Error| Error::CheckoutFailed {
            branch: branch.to_string(),
            message: e.message().to_string(),
        };

        match create_from {
            Some(start) => {
                let oid = Oid::from_str(start.as_str()).map_err(checkout_failed)?;
                let commit = repo.find_commit(oid).map_err(checkout_failed)?;
                repo.branch(branch, &commit, false).map_err(checkout_failed)?;
            }
            None => {
                // set_head would happily point at an unborn branch
                repo.find_reference(&refname)
                    .map_err(|_| Error::BranchNotFound {
                        name: branch.to_string(),
                    })?;
            }
        }

        repo.set_head(&refname).map_err(checkout_failed)?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(checkout_failed)?;
        Ok(())
    }

    fn worktree(&self) -> Result<&Path> {
        let repo = self.repository()?;
        repo.workdir()
            .ok_or_else(|| git2::Error::from_str("repository has no working directory").into())
    }

    fn stage(&mut self, path: &RepoRelativePath) -> Result<()> {
        let repo = self.repository()?;
        let mut index = repo.index()?;
        let spec = [path.pathspec()];
        // FORCE: a mirror includes files the destination's .gitignore would skip
        index.add_all(spec.iter(), IndexAddOption::FORCE, None)?;
        index.update_all(spec.iter(), None)?;
        index.write()?;
        Ok(())
    }

    fn status(&self) -> Result<StatusSummary> {
        let repo = self.repository()?;
        let head_tree = repo.head()?.peel_to_tree()?;
        let index = repo.index()?;
        let diff = repo.diff_tree_to_index(Some(&head_tree), Some(&index), None)?;

        let mut summary = StatusSummary::default();
        for delta in diff.deltas() {
            let file = match delta.status() {
                Delta::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };
            let path = file
                .path()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            match delta.status() {
                Delta::Added | Delta::Copied => summary.added.push(path),
                Delta::Deleted => summary.deleted.push(path),
                _ => summary.modified.push(path),
            }
        }
        Ok(summary)
    }

    fn commit(&mut self, message: &str, author: &AuthorSignature) -> Result<CommitId> {
        let repo = self.repository()?;
        let when = git2::Time::new(
            author.when.timestamp(),
            author.when.offset().local_minus_utc() / 60,
        );
        let signature = git2::Signature::new(&author.name, &author.email, &when)?;

        let tree_id = repo.index()?.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let parent = repo.head()?.peel_to_commit()?;

        let oid = repo.commit(None, &signature, &signature, message, &tree, &[&parent])?;
        Ok(CommitId::new(oid.to_string()))
    }

    fn set_reference(&mut self, branch: &str, id: &CommitId) -> Result<()> {
        let repo = self.repository()?;
        let oid = Oid::from_str(id.as_str())?;
        repo.reference(
            &head_ref(branch),
            oid,
            true,
            &format!("artifact-sync: commit {}", id.short()),
        )?;
        Ok(())
    }

    fn push(&mut self, branch: &str, force: bool) -> Result<()> {
        let repo = self.repository()?;
        let refname = head_ref(branch);
        let refspec = format!("{}{refname}:{refname}", if force { "+" } else { "" });
        let mut remote = repo.find_remote(REMOTE)?;

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        {
            let mut callbacks = self.auth.callbacks();
            callbacks.push_update_reference(|_reference, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(message.to_string());
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[&refspec], Some(&mut options))
                .map_err(|e| Error::PushFailed {
                    message: e.message().to_string(),
                })?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(Error::PushRejected {
                reference: refname,
                message,
            });
        }
        Ok(())
    }
}
