//! Run configuration
//!
//! [`SyncSettings`] is the loose, caller-facing shape (what the CLI parses).
//! [`SyncRequest::from_settings`] validates it once into an immutable
//! [`SyncRequest`]; nothing downstream re-reads flags or the environment.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use sync_fs::RepoRelativePath;
use sync_git::naming::{generated_head_branch, validate_branch_name};
use sync_host::{DEFAULT_API_URL, RepoSlug};

use crate::credentials::{Credential, CredentialSet};
use crate::identity::{mask_url, parse_repo_url};
use crate::{Error, Result};

/// Unvalidated run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub message: Option<String>,
    pub input_path: PathBuf,
    pub output_repo: String,
    pub output_repo_path: String,
    pub output_base: String,
    pub output_head: Option<String>,
    pub pr_base: Option<String>,
    pub merge_base: Option<String>,
    pub pr_body: String,
    pub commit_timestamp: String,
    pub credentials: CredentialSet,
    pub api_url: String,
    /// Clone and fetch depth; 0 transfers full history
    pub clone_depth: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            message: None,
            input_path: PathBuf::from("."),
            output_repo: String::new(),
            output_repo_path: ".".to_string(),
            output_base: "develop".to_string(),
            output_head: None,
            pr_base: None,
            merge_base: None,
            pr_body: "Sync".to_string(),
            commit_timestamp: "now".to_string(),
            credentials: CredentialSet::default(),
            api_url: DEFAULT_API_URL.to_string(),
            clone_depth: 1,
        }
    }
}

/// When the sync commit is dated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTime {
    /// Wall clock at commit time
    Now,
    At(DateTime<FixedOffset>),
}

impl CommitTime {
    /// The literal `now` or an RFC 3339 timestamp.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == "now" {
            return Ok(Self::Now);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(Self::At)
            .map_err(|e| Error::input(format!("parse commit timestamp '{raw}'"), e))
    }

    pub fn resolve(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Now => Utc::now().fixed_offset(),
            Self::At(at) => *at,
        }
    }
}

/// The ambient values defaults are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// `CI_PROJECT_NAME`
    pub project_name: Option<String>,
    /// `CI_COMMIT_REF_NAME`
    pub ref_name: Option<String>,
    pub current_dir: Option<PathBuf>,
    /// Instant generated head branches are named after
    pub now: DateTime<Utc>,
}

impl RunContext {
    pub fn from_env() -> Self {
        Self {
            project_name: std::env::var("CI_PROJECT_NAME").ok(),
            ref_name: std::env::var("CI_COMMIT_REF_NAME").ok(),
            current_dir: std::env::current_dir().ok(),
            now: Utc::now(),
        }
    }

    /// `Sync <project>/<ref>`
    pub fn default_commit_message(&self) -> String {
        let project = non_empty(&self.project_name)
            .map(str::to_string)
            .or_else(|| {
                self.current_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
            })
            .unwrap_or_default();
        let ref_name = non_empty(&self.ref_name).unwrap_or("unknown");
        format!("Sync {project}/{ref_name}")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A validated sync run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    input_path: PathBuf,
    repo_url: String,
    repo: RepoSlug,
    subdir: RepoRelativePath,
    base: String,
    head: String,
    head_generated: bool,
    message: String,
    commit_time: CommitTime,
    credential: Credential,
    pr_base: Option<String>,
    merge_base: Option<String>,
    pr_body: String,
    api_url: String,
    clone_depth: Option<i32>,
}

impl SyncRequest {
    /// Validate `settings` against the process environment.
    pub fn from_settings(settings: SyncSettings) -> Result<Self> {
        Self::from_settings_in(settings, &RunContext::from_env())
    }

    /// Validate `settings`, deriving defaults from `context`.
    ///
    /// Performs no network access. Fails on a malformed timestamp, missing
    /// or incomplete credentials, an unparseable repository URL, an invalid
    /// branch name, a destination path outside the worktree, or an input
    /// path that is not a directory.
    pub fn from_settings_in(settings: SyncSettings, context: &RunContext) -> Result<Self> {
        let commit_time = CommitTime::parse(&settings.commit_timestamp)?;

        let repo_url = settings.output_repo.trim().to_string();
        if repo_url.is_empty() {
            return Err(Error::config("read destination repository", "no URL given"));
        }
        let repo = parse_repo_url(&repo_url)?;

        let subdir = RepoRelativePath::parse(&settings.output_repo_path).map_err(|e| {
            Error::config(
                format!("check destination path '{}'", settings.output_repo_path),
                e,
            )
        })?;

        let base = branch("base", &settings.output_base)?;
        let (head, head_generated) = match non_empty(&settings.output_head) {
            Some(head) => (branch("head", head)?, false),
            None => (generated_head_branch(context.now), true),
        };
        let pr_base = optional_branch("pull request base", &settings.pr_base)?;
        let merge_base = optional_branch("merge base", &settings.merge_base)?;

        let credential = settings.credentials.resolve()?;

        let clone_depth = match settings.clone_depth {
            0 => None,
            depth => Some(i32::try_from(depth).map_err(|e| Error::config("check clone depth", e))?),
        };

        let input_path = settings.input_path;
        check_input_dir(&input_path)?;

        let message = match non_empty(&settings.message) {
            Some(message) => message.to_string(),
            None => context.default_commit_message(),
        };

        let request = Self {
            input_path,
            repo_url,
            repo,
            subdir,
            base,
            head,
            head_generated,
            message,
            commit_time,
            credential,
            pr_base,
            merge_base,
            pr_body: settings.pr_body,
            api_url: settings.api_url,
            clone_depth,
        };
        tracing::debug!(
            url = %mask_url(&request.repo_url),
            repo = %request.repo,
            base = %request.base,
            head = %request.head,
            path = %request.subdir,
            auth = request.credential.scheme(),
            "Validated sync request"
        );
        Ok(request)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    pub fn subdir(&self) -> &RepoRelativePath {
        &self.subdir
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Head branch, fixed for the whole run.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Whether [`head`](Self::head) was generated rather than configured.
    pub fn head_generated(&self) -> bool {
        self.head_generated
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn commit_time(&self) -> CommitTime {
        self.commit_time
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn pr_base(&self) -> Option<&str> {
        self.pr_base.as_deref()
    }

    pub fn merge_base(&self) -> Option<&str> {
        self.merge_base.as_deref()
    }

    pub fn pr_body(&self) -> &str {
        &self.pr_body
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `None` for full history.
    pub fn clone_depth(&self) -> Option<i32> {
        self.clone_depth
    }
}

fn branch(role: &str, name: &str) -> Result<String> {
    let name = name.trim();
    validate_branch_name(name).map_err(|e| Error::config(format!("check {role} branch"), e))?;
    Ok(name.to_string())
}

fn optional_branch(role: &str, name: &Option<String>) -> Result<Option<String>> {
    non_empty(name).map(|name| branch(role, name)).transpose()
}

fn check_input_dir(path: &Path) -> Result<()> {
    let context = || format!("read input directory {}", path.display());
    let meta = std::fs::metadata(path).map_err(|e| Error::input(context(), e))?;
    if !meta.is_dir() {
        return Err(Error::input(context(), "not a directory"));
    }
    Ok(())
}
