//! Commit history of a local branch

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::Repository;

#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    /// Author timestamp in the author's offset
    pub timestamp: DateTime<FixedOffset>,
    pub parent_count: usize,
}

/// The last `max_count` first-parent commits of `branch`, most recent first.
///
/// # Panics
/// When `branch` does not exist or the walk fails.
pub fn list_recent_commits(repo: &Repository, branch: &str, max_count: usize) -> Vec<CommitInfo> {
    let tip = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .and_then(|r| r.peel_to_commit())
        .unwrap_or_else(|e| panic!("list_recent_commits: {branch}: {e}"));

    let mut revwalk = repo.revwalk().unwrap();
    revwalk.push(tip.id()).unwrap();
    revwalk.simplify_first_parent().unwrap();

    revwalk
        .take(max_count)
        .map(|oid| commit_info(&repo.find_commit(oid.unwrap()).unwrap()))
        .collect()
}

fn commit_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();
    let when = author.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());

    CommitInfo {
        id: commit.id().to_string(),
        message: commit.message().unwrap_or("").to_string(),
        author_name: author.name().unwrap_or("").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        timestamp: offset.timestamp_opt(when.seconds(), 0).unwrap(),
        parent_count: commit.parent_count(),
    }
}
