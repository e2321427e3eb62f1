//! The full run: authenticate, synchronize, publish

use serde::Serialize;
use sync_git::{Git2Backend, VcsBackend};
use sync_host::{GitHubClient, HostApi};

use crate::config::SyncRequest;
use crate::engine::{AuthorIdentity, ChangeSummary, CommitResult, SyncEngine};
use crate::reconcile::{PublishOutcome, PublishPlan, PublishReconciler};
use crate::{Error, Result};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// `owner/name`
    pub repository: String,
    pub base: String,
    pub head: String,
    /// Whether the head branch was created by this run
    pub head_created: bool,
    /// Remote tip of the head branch before the push
    pub previous_tip: Option<String>,
    pub author: AuthorIdentity,
    pub commit: CommitResult,
    pub changes: ChangeSummary,
    pub outcome: PublishOutcome,
}

/// Run against GitHub with the git2 backend.
pub fn run(request: &SyncRequest) -> Result<SyncReport> {
    let host = GitHubClient::new(request.api_url(), request.credential().host_auth());
    let backend = Git2Backend::new(request.credential().git_auth()).with_depth(request.clone_depth());
    run_with(request, backend, &host)
}

/// Run with explicit backend and host.
pub fn run_with<B, H>(request: &SyncRequest, backend: B, host: &H) -> Result<SyncReport>
where
    B: VcsBackend,
    H: HostApi,
{
    let user = host
        .authenticated_user()
        .map_err(|e| Error::from_host("authenticate with the host", e))?;
    let author = AuthorIdentity::for_user(&user);
    tracing::info!(login = %author.name, email = %author.email, "Authenticated");

    let mut engine = SyncEngine::new(backend);
    let synced = engine.sync(request, &author)?;

    let outcome = PublishReconciler::new(host, request.repo())
        .reconcile(&PublishPlan::from_request(request))?;

    Ok(SyncReport {
        repository: request.repo().to_string(),
        base: request.base().to_string(),
        head: request.head().to_string(),
        head_created: synced.created(),
        previous_tip: synced.head_before.tip.as_ref().map(ToString::to_string),
        author,
        commit: synced.commit,
        changes: synced.changes,
        outcome,
    })
}
