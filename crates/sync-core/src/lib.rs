//! Synchronization and publish workflow for artifact-sync
//!
//! Build a [`SyncRequest`] from [`SyncSettings`], then hand it to
//! [`workflow::run`]. The pieces are usable on their own:
//!
//! - [`credentials`] picks token or basic authentication
//! - [`identity`] turns a repository URL into an owner/name pair
//! - [`engine`] mirrors the input into the head branch and force-pushes it
//! - [`reconcile`] merges the head or opens a deduplicated draft pull request

pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod workflow;

pub use config::{CommitTime, RunContext, SyncRequest, SyncSettings};
pub use credentials::{Credential, CredentialSet};
pub use engine::{AuthorIdentity, ChangeSummary, CommitResult, SyncEngine, SyncOutcome};
pub use error::{Error, Result};
pub use identity::{mask_url, parse_repo_url};
pub use reconcile::{PublishOutcome, PublishPlan, PublishReconciler};
pub use workflow::{SyncReport, run, run_with};
