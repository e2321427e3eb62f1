//! Bare remote repositories for sync tests.
//!
//! A [`BareRemote`] stands in for the hosted destination repository. Commits
//! are written straight into the bare object store with `git2`, so no `git`
//! binary or user configuration is needed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use git2::build::TreeUpdateBuilder;
use git2::{FileMode, ObjectType, Oid, Repository, Signature, TreeWalkMode, TreeWalkResult};
use tempfile::TempDir;

/// A bare repository in a temporary directory.
///
/// # Panics
/// Every method panics on git failures; this is test-only code.
pub struct BareRemote {
    repo: Repository,
    path: PathBuf,
    _dir: TempDir,
}

impl Default for BareRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl BareRemote {
    /// An empty bare repository.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote.git");
        let repo = Repository::init_bare(&path)
            .unwrap_or_else(|e| panic!("BareRemote: init_bare failed: {e}"));
        Self {
            repo,
            path,
            _dir: dir,
        }
    }

    /// A bare repository with one commit on `branch` containing `files`.
    pub fn with_branch(branch: &str, files: &[(&str, &str)]) -> Self {
        let remote = Self::new();
        remote.commit(branch, files, "Initial commit");
        remote
            .repo
            .set_head(&format!("refs/heads/{branch}"))
            .unwrap_or_else(|e| panic!("BareRemote: set_head failed: {e}"));
        remote
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone URL: the repository path, which libgit2 treats as a local remote.
    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// `file://` form of [`url`](Self::url), for code that needs a URL with
    /// a scheme and at least two path segments.
    pub fn file_url(&self) -> String {
        format!("file://{}", self.path.to_string_lossy().replace('\\', "/"))
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Add or overwrite `files` on top of `branch`, creating it if needed.
    pub fn commit(&self, branch: &str, files: &[(&str, &str)], message: &str) -> Oid {
        let refname = format!("refs/heads/{branch}");
        let parent = self
            .repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());

        let base_tree = match &parent {
            Some(commit) => commit.tree().unwrap(),
            None => {
                let empty = self.repo.treebuilder(None).unwrap().write().unwrap();
                self.repo.find_tree(empty).unwrap()
            }
        };

        let mut update = TreeUpdateBuilder::new();
        for (path, content) in files {
            let blob = self.repo.blob(content.as_bytes()).unwrap();
            update.upsert(*path, blob, FileMode::Blob);
        }
        let tree_id = update.create_updated(&self.repo, &base_tree).unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("Fixture", "fixture@example.com").unwrap();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some(&refname), &signature, &signature, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("BareRemote: commit to {branch} failed: {e}"))
    }

    pub fn branch_tip(&self, branch: &str) -> Option<Oid> {
        self.repo
            .refname_to_id(&format!("refs/heads/{branch}"))
            .ok()
    }

    /// Number of commits reachable from `branch`.
    pub fn commit_count(&self, branch: &str) -> usize {
        let Some(tip) = self.branch_tip(branch) else {
            return 0;
        };
        let mut walk = self.repo.revwalk().unwrap();
        walk.push(tip).unwrap();
        walk.count()
    }

    /// Message of the tip commit of `branch`.
    pub fn tip_message(&self, branch: &str) -> Option<String> {
        let tip = self.branch_tip(branch)?;
        let commit = self.repo.find_commit(tip).ok()?;
        commit.message().map(str::to_string)
    }

    /// Content of `path` at the tip of `branch`.
    pub fn read_file(&self, branch: &str, path: &str) -> Option<String> {
        let tip = self.branch_tip(branch)?;
        let tree = self.repo.find_commit(tip).ok()?.tree().ok()?;
        let entry = tree.get_path(Path::new(path)).ok()?;
        let blob = self.repo.find_blob(entry.id()).ok()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    /// Every file below `prefix` at the tip of `branch`, keyed by path
    /// relative to `prefix`. An empty prefix lists the whole tree.
    pub fn files(&self, branch: &str, prefix: &str) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        let Some(tip) = self.branch_tip(branch) else {
            return files;
        };
        let tree = self.repo.find_commit(tip).unwrap().tree().unwrap();
        let prefix = prefix.trim_matches('/');

        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let full = format!("{root}{}", entry.name().unwrap_or(""));
                let relative = if prefix.is_empty() {
                    Some(full.as_str())
                } else {
                    full.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('/'))
                };
                if let Some(relative) = relative {
                    let blob = self.repo.find_blob(entry.id()).unwrap();
                    files.insert(
                        relative.to_string(),
                        String::from_utf8_lossy(blob.content()).into_owned(),
                    );
                }
            }
            TreeWalkResult::Ok
        })
        .unwrap();

        files
    }
}
