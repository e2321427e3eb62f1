//! GitHub REST API client

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::auth::HostAuth;
use crate::client::HostApi;
use crate::types::{MergeCommit, NewPullRequest, PullRequest, RepoSlug, User};
use crate::{Error, Result};

/// Public GitHub API root. GitHub Enterprise uses `https://<host>/api/v3`.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("artifact-sync/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking GitHub client.
pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: String,
    auth: HostAuth,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, auth: HostAuth) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(TIMEOUT)
            .timeout_read(TIMEOUT)
            .timeout_write(TIMEOUT)
            .build();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent,
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn repo_endpoint(&self, repo: &RepoSlug, path: &str) -> String {
        self.endpoint(&format!("/repos/{}/{}{}", repo.owner, repo.name, path))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, url)
            .set("User-Agent", USER_AGENT)
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("Authorization", &self.auth.authorization());
        match self.auth.otp() {
            Some(otp) => request.set("X-GitHub-OTP", otp),
            None => request,
        }
    }

    fn send(
        &self,
        method: &str,
        url: &str,
        request: ureq::Request,
        body: Option<serde_json::Value>,
    ) -> Result<ureq::Response> {
        tracing::debug!(method, url, "Host API request");
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        result.map_err(|e| map_error(method, url, e))
    }
}

impl HostApi for GitHubClient {
    fn authenticated_user(&self) -> Result<User> {
        let url = self.endpoint("/user");
        let response = self.send("GET", &url, self.request("GET", &url), None)?;
        decode(&url, response)
    }

    fn merge(&self, repo: &RepoSlug, head: &str, base: &str) -> Result<Option<MergeCommit>> {
        let url = self.repo_endpoint(repo, "/merges");
        let body = json!({ "base": base, "head": head });
        let response = self.send("POST", &url, self.request("POST", &url), Some(body))?;

        // 204: base already contains head
        if response.status() == 204 {
            return Ok(None);
        }
        decode(&url, response).map(Some)
    }

    fn list_pull_requests(
        &self,
        repo: &RepoSlug,
        head: &str,
        base: &str,
    ) -> Result<Vec<PullRequest>> {
        let url = self.repo_endpoint(repo, "/pulls");
        let request = self
            .request("GET", &url)
            .query("state", "open")
            .query("head", head)
            .query("base", base);
        let response = self.send("GET", &url, request, None)?;
        decode(&url, response)
    }

    fn create_pull_request(
        &self,
        repo: &RepoSlug,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        let url = self.repo_endpoint(repo, "/pulls");
        let body = serde_json::to_value(request).map_err(|e| Error::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let response = self.send("POST", &url, self.request("POST", &url), Some(body))?;
        decode(&url, response)
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T> {
    response.into_json().map_err(|e| Error::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn map_error(method: &str, url: &str, error: ureq::Error) -> Error {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            Error::Status {
                method: method.to_string(),
                url: url.to_string(),
                status,
                message: error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => Error::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

/// Pull the `message` field out of a GitHub error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    match serde_json::from_str::<ApiError>(body) {
        Ok(error) => error.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
