//! Repository host API for artifact-sync
//!
//! The [`HostApi`] trait covers the four calls the publish step makes:
//! identifying the authenticated user, merging branches, and listing or
//! creating pull requests. [`GitHubClient`] implements it against the
//! GitHub REST API.

pub mod auth;
pub mod client;
pub mod error;
pub mod github;
pub mod types;

pub use auth::HostAuth;
pub use client::HostApi;
pub use error::{Error, Result};
pub use github::{DEFAULT_API_URL, GitHubClient};
pub use types::{MergeCommit, NewPullRequest, PullRequest, RepoSlug, User};
