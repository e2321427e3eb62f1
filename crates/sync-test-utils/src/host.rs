//! In-memory host API.
//!
//! [`FakeHost`] keeps open pull requests in memory and records every call,
//! so tests can assert both on outcomes and on which requests were made.

use std::cell::RefCell;

use sync_host::types::{BranchRef, CommitDetail};
use sync_host::{Error, HostApi, MergeCommit, NewPullRequest, PullRequest, RepoSlug, Result, User};

/// A host API call as observed by [`FakeHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    AuthenticatedUser,
    Merge { head: String, base: String },
    ListPullRequests { head: String, base: String },
    CreatePullRequest(NewPullRequest),
}

#[derive(Default)]
struct State {
    pulls: Vec<PullRequest>,
    calls: Vec<HostCall>,
    next_number: u64,
    merge_failure: Option<(u16, String)>,
    up_to_date: bool,
    unreachable: bool,
}

pub struct FakeHost {
    user: User,
    state: RefCell<State>,
}

impl FakeHost {
    /// A host whose authenticated user is `login` with no public email.
    pub fn new(login: &str) -> Self {
        Self {
            user: User {
                login: login.to_string(),
                email: None,
            },
            state: RefCell::new(State {
                next_number: 1,
                ..State::default()
            }),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.user.email = Some(email.to_string());
        self
    }

    /// Seed an open pull request from `owner:head` into `base`.
    pub fn with_open_pull_request(self, owner: &str, head: &str, base: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let number = state.next_number;
            state.next_number += 1;
            state.pulls.push(pull_request(number, owner, head, base, "existing"));
        }
        self
    }

    /// Make every merge fail with the given HTTP status and message.
    pub fn failing_merge(self, status: u16, message: &str) -> Self {
        self.state.borrow_mut().merge_failure = Some((status, message.to_string()));
        self
    }

    /// Make merges report that the base already contains the head.
    pub fn already_merged(self) -> Self {
        self.state.borrow_mut().up_to_date = true;
        self
    }

    /// Make every call after authentication fail at the transport.
    pub fn unreachable_after_login(self) -> Self {
        self.state.borrow_mut().unreachable = true;
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    pub fn open_pull_requests(&self) -> Vec<PullRequest> {
        self.state.borrow().pulls.clone()
    }

    fn record(&self, call: HostCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check_reachable(&self, path: String) -> Result<()> {
        if self.state.borrow().unreachable {
            return Err(Error::Transport {
                url: format!("fake://{path}"),
                message: "connection refused".into(),
            });
        }
        Ok(())
    }
}

impl HostApi for FakeHost {
    fn authenticated_user(&self) -> Result<User> {
        self.record(HostCall::AuthenticatedUser);
        Ok(self.user.clone())
    }

    fn merge(&self, repo: &RepoSlug, head: &str, base: &str) -> Result<Option<MergeCommit>> {
        self.record(HostCall::Merge {
            head: head.to_string(),
            base: base.to_string(),
        });
        self.check_reachable(format!("repos/{repo}/merges"))?;

        let state = self.state.borrow();
        if let Some((status, message)) = &state.merge_failure {
            return Err(Error::Status {
                method: "POST".into(),
                url: format!("fake://repos/{repo}/merges"),
                status: *status,
                message: message.clone(),
            });
        }
        if state.up_to_date {
            return Ok(None);
        }

        let sha = format!("{:0>40}", state.calls.len());
        Ok(Some(MergeCommit {
            html_url: format!("https://github.com/{repo}/commit/{sha}"),
            sha,
            commit: CommitDetail {
                message: format!("Merge {head} into {base}"),
            },
        }))
    }

    fn list_pull_requests(
        &self,
        repo: &RepoSlug,
        head: &str,
        base: &str,
    ) -> Result<Vec<PullRequest>> {
        self.record(HostCall::ListPullRequests {
            head: head.to_string(),
            base: base.to_string(),
        });
        self.check_reachable(format!("repos/{repo}/pulls"))?;
        Ok(self
            .state
            .borrow()
            .pulls
            .iter()
            .filter(|pr| pr.head.label == head && pr.base.branch == base)
            .cloned()
            .collect())
    }

    fn create_pull_request(
        &self,
        repo: &RepoSlug,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        self.record(HostCall::CreatePullRequest(request.clone()));
        self.check_reachable(format!("repos/{repo}/pulls"))?;

        let mut state = self.state.borrow_mut();
        let number = state.next_number;
        state.next_number += 1;

        let mut pr = pull_request(number, &repo.owner, &request.head, &request.base, &request.title);
        pr.html_url = format!("https://github.com/{repo}/pull/{number}");
        pr.draft = request.draft;
        state.pulls.push(pr.clone());
        Ok(pr)
    }
}

fn pull_request(number: u64, owner: &str, head: &str, base: &str, title: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/{owner}/pull/{number}"),
        title: title.to_string(),
        draft: true,
        head: BranchRef {
            label: format!("{owner}:{head}"),
            branch: head.to_string(),
        },
        base: BranchRef {
            label: format!("{owner}:{base}"),
            branch: base.to_string(),
        },
    }
}
