//! Branch and reference naming

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Prefix for head branches generated when none is configured.
pub const GENERATED_PREFIX: &str = "auto/sync";

/// Name a head branch after the instant of the run.
///
/// `2024-03-05T14:07:09Z` -> `auto/sync/20240305T140709Z`
pub fn generated_head_branch(at: DateTime<Utc>) -> String {
    format!("{}/{}", GENERATED_PREFIX, at.format("%Y%m%dT%H%M%SZ"))
}

/// Full reference name of a local branch.
pub fn head_ref(branch: &str) -> String {
    format!("refs/heads/{branch}")
}

/// Reject names git would refuse as `refs/heads/<name>`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() || !git2::Reference::is_valid_name(&head_ref(name)) {
        return Err(Error::InvalidBranchName {
            name: name.to_string(),
        });
    }
    Ok(())
}
