//! Publishing a pushed head branch
//!
//! After the push, the head branch is either merged straight into a base
//! branch or offered as a draft pull request. Pull requests are deduplicated:
//! when one is already open from the same head into the same base, nothing
//! new is created.

use serde::Serialize;
use sync_host::{HostApi, NewPullRequest, RepoSlug};

use crate::config::SyncRequest;
use crate::{Error, Result};

/// What happened on the host after the push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PublishOutcome {
    Merged {
        /// Branch the head was merged into
        base: String,
        sha: String,
        message: String,
        url: String,
    },
    /// The base already contained the head; the host made no merge commit
    AlreadyMerged { base: String },
    PullRequestCreated {
        number: u64,
        url: String,
    },
    PullRequestAlreadyExists {
        number: u64,
        url: String,
    },
    /// Neither a merge base nor a pull request base was configured
    Skipped,
}

/// Inputs to [`PublishReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub head: String,
    pub merge_base: Option<String>,
    pub pr_base: Option<String>,
    pub title: String,
    pub body: String,
}

impl PublishPlan {
    pub fn from_request(request: &SyncRequest) -> Self {
        Self {
            head: request.head().to_string(),
            merge_base: request.merge_base().map(str::to_string),
            pr_base: request.pr_base().map(str::to_string),
            title: request.message().to_string(),
            body: request.pr_body().to_string(),
        }
    }
}

pub struct PublishReconciler<'a, H> {
    host: &'a H,
    repo: &'a RepoSlug,
}

impl<'a, H: HostApi> PublishReconciler<'a, H> {
    pub fn new(host: &'a H, repo: &'a RepoSlug) -> Self {
        Self { host, repo }
    }

    /// Merge, open a pull request, or do nothing, depending on the plan.
    ///
    /// A merge base takes precedence over a pull request base.
    pub fn reconcile(&self, plan: &PublishPlan) -> Result<PublishOutcome> {
        match (&plan.merge_base, &plan.pr_base) {
            (Some(base), pr_base) => {
                if let Some(pr_base) = pr_base {
                    tracing::warn!(
                        merge_base = %base,
                        pr_base = %pr_base,
                        "Both a merge base and a pull request base were given; merging only"
                    );
                }
                self.merge(&plan.head, base)
            }
            (None, Some(base)) => self.open_pull_request(plan, base),
            (None, None) => {
                tracing::info!(branch = %plan.head, "No merge or pull request requested");
                Ok(PublishOutcome::Skipped)
            }
        }
    }

    fn merge(&self, head: &str, base: &str) -> Result<PublishOutcome> {
        tracing::info!(repo = %self.repo, branch = head, base, "Merging head branch");
        let merged = self
            .host
            .merge(self.repo, head, base)
            .map_err(|e| Error::api(format!("merge '{head}' into '{base}'"), e))?;

        match merged {
            Some(commit) => {
                tracing::info!(
                    commit = %commit.sha,
                    url = %commit.html_url,
                    "Merged: {}",
                    commit.commit.message
                );
                Ok(PublishOutcome::Merged {
                    base: base.to_string(),
                    sha: commit.sha,
                    message: commit.commit.message,
                    url: commit.html_url,
                })
            }
            None => {
                tracing::info!(branch = head, base, "Base already contains head; nothing to merge");
                Ok(PublishOutcome::AlreadyMerged {
                    base: base.to_string(),
                })
            }
        }
    }

    fn open_pull_request(&self, plan: &PublishPlan, base: &str) -> Result<PublishOutcome> {
        let head = self.repo.qualified_head(&plan.head);
        let existing = self
            .host
            .list_pull_requests(self.repo, &head, base)
            .map_err(|e| Error::api(format!("list pull requests from '{head}'"), e))?;

        if let Some(first) = existing.first() {
            for pr in &existing {
                tracing::info!(number = pr.number, url = %pr.html_url, "Pull request already open");
            }
            return Ok(PublishOutcome::PullRequestAlreadyExists {
                number: first.number,
                url: first.html_url.clone(),
            });
        }

        let request = NewPullRequest {
            title: plan.title.clone(),
            head: plan.head.clone(),
            base: base.to_string(),
            body: plan.body.clone(),
            draft: true,
        };
        let created = self
            .host
            .create_pull_request(self.repo, &request)
            .map_err(|e| Error::api(format!("open pull request from '{head}' into '{base}'"), e))?;
        tracing::info!(number = created.number, url = %created.html_url, "Opened draft pull request");
        Ok(PublishOutcome::PullRequestCreated {
            number: created.number,
            url: created.html_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sync_test_utils::host::{FakeHost, HostCall};

    use super::*;

    fn slug() -> RepoSlug {
        RepoSlug::new("myorg", "site")
    }

    fn plan(merge_base: Option<&str>, pr_base: Option<&str>) -> PublishPlan {
        PublishPlan {
            head: "auto/sync/X".into(),
            merge_base: merge_base.map(str::to_string),
            pr_base: pr_base.map(str::to_string),
            title: "Sync app/main".into(),
            body: "Sync".into(),
        }
    }

    #[test]
    fn neither_base_skips() {
        let host = FakeHost::new("ci-bot");
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(None, None))
            .unwrap();

        assert_eq!(outcome, PublishOutcome::Skipped);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn merge_returns_commit() {
        let host = FakeHost::new("ci-bot");
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(Some("main"), None))
            .unwrap();

        let PublishOutcome::Merged { base, message, url, .. } = outcome else {
            panic!("expected a merge, got {outcome:?}");
        };
        assert_eq!(base, "main");
        assert_eq!(message, "Merge auto/sync/X into main");
        assert!(url.starts_with("https://github.com/myorg/site/commit/"));
        assert_eq!(
            host.calls(),
            vec![HostCall::Merge {
                head: "auto/sync/X".into(),
                base: "main".into(),
            }]
        );
    }

    #[test]
    fn merge_wins_over_pull_request() {
        let host = FakeHost::new("ci-bot");
        let repo = slug();
        PublishReconciler::new(&host, &repo)
            .reconcile(&plan(Some("main"), Some("develop")))
            .unwrap();

        let calls = host.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], HostCall::Merge { .. }));
    }

    #[test]
    fn merge_conflict_is_api_error() {
        let host = FakeHost::new("ci-bot").failing_merge(409, "Merge conflict");
        let repo = slug();
        let err = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(Some("main"), None))
            .unwrap_err();

        assert!(matches!(err, Error::Api { ref source, .. } if source.is_conflict()));
    }

    #[test]
    fn unreachable_host_during_publish_is_api_error() {
        let repo = slug();
        for plan in [plan(Some("main"), None), plan(None, Some("develop"))] {
            let host = FakeHost::new("ci-bot").unreachable_after_login();
            let err = PublishReconciler::new(&host, &repo)
                .reconcile(&plan)
                .unwrap_err();
            assert!(
                matches!(err, Error::Api { source: sync_host::Error::Transport { .. }, .. }),
                "got: {err:?}"
            );
        }
    }

    #[test]
    fn nothing_to_merge() {
        let host = FakeHost::new("ci-bot").already_merged();
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(Some("main"), None))
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::AlreadyMerged {
                base: "main".into()
            }
        );
    }

    #[test]
    fn creates_draft_pull_request() {
        let host = FakeHost::new("ci-bot");
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(None, Some("develop")))
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::PullRequestCreated { number: 1, .. }));
        assert_eq!(
            host.calls(),
            vec![
                HostCall::ListPullRequests {
                    head: "myorg:auto/sync/X".into(),
                    base: "develop".into(),
                },
                HostCall::CreatePullRequest(NewPullRequest {
                    title: "Sync app/main".into(),
                    head: "auto/sync/X".into(),
                    base: "develop".into(),
                    body: "Sync".into(),
                    draft: true,
                }),
            ]
        );
    }

    #[test]
    fn existing_pull_request_is_not_duplicated() {
        let host = FakeHost::new("ci-bot").with_open_pull_request("myorg", "auto/sync/X", "develop");
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(None, Some("develop")))
            .unwrap();

        assert!(matches!(
            outcome,
            PublishOutcome::PullRequestAlreadyExists { number: 1, .. }
        ));
        assert_eq!(host.open_pull_requests().len(), 1);
        assert!(
            !host
                .calls()
                .iter()
                .any(|c| matches!(c, HostCall::CreatePullRequest(_)))
        );
    }

    #[test]
    fn pull_request_into_other_base_does_not_count() {
        let host = FakeHost::new("ci-bot").with_open_pull_request("myorg", "auto/sync/X", "main");
        let repo = slug();
        let outcome = PublishReconciler::new(&host, &repo)
            .reconcile(&plan(None, Some("develop")))
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::PullRequestCreated { number: 2, .. }));
    }

    #[test]
    fn outcome_serializes_with_action_tag() {
        let json = serde_json::to_value(PublishOutcome::PullRequestCreated {
            number: 7,
            url: "https://github.com/myorg/site/pull/7".into(),
        })
        .unwrap();
        assert_eq!(json["action"], "pull_request_created");
        assert_eq!(json["number"], 7);
        assert_eq!(
            serde_json::to_value(PublishOutcome::Skipped).unwrap()["action"],
            "skipped"
        );
    }
}
