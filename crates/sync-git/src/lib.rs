//! Git backend for artifact-sync
//!
//! Exposes the small set of version-control operations the sync workflow
//! needs as the [`VcsBackend`] trait, with a `git2` implementation.

pub mod auth;
pub mod backend;
pub mod error;
pub mod naming;
pub mod repository;

pub use auth::GitAuth;
pub use backend::{AuthorSignature, BranchState, CommitId, StatusSummary, VcsBackend};
pub use error::{Error, Result};
pub use repository::Git2Backend;
