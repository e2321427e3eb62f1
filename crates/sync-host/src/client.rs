//! Host API capability

use crate::Result;
use crate::types::{MergeCommit, NewPullRequest, PullRequest, RepoSlug, User};

/// Operations the publish step performs against the repository host.
pub trait HostApi {
    /// The account the credentials belong to.
    fn authenticated_user(&self) -> Result<User>;

    /// Merge `head` into `base` on the host.
    ///
    /// Returns `None` when `base` already contains `head`.
    fn merge(&self, repo: &RepoSlug, head: &str, base: &str) -> Result<Option<MergeCommit>>;

    /// Open pull requests whose head is `head` (`owner:branch`) and base is `base`.
    fn list_pull_requests(&self, repo: &RepoSlug, head: &str, base: &str)
    -> Result<Vec<PullRequest>>;

    fn create_pull_request(&self, repo: &RepoSlug, request: &NewPullRequest)
    -> Result<PullRequest>;
}
