//! Runs at the default clone depth against a `git://` remote.
//!
//! Skipped when `git daemon` cannot be started.

mod common;

use pretty_assertions::assert_eq;
use sync_core::{SyncReport, SyncRequest, SyncSettings};
use sync_git::Git2Backend;
use sync_test_utils::daemon::GitDaemon;
use sync_test_utils::git::BareRemote;
use sync_test_utils::host::FakeHost;
use sync_test_utils::tree::{input_tree, reset_files};

use common::{request, settings};

fn run_shallow(request: &SyncRequest, host: &FakeHost) -> SyncReport {
    let backend = Git2Backend::new(request.credential().git_auth()).with_depth(request.clone_depth());
    sync_core::run_with(request, backend, host).unwrap()
}

#[test]
fn default_depth_creates_then_reuses_head() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let Some(daemon) = GitDaemon::serve(&remote) else {
        eprintln!("git daemon unavailable; skipping");
        return;
    };
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_repo: daemon.url().to_string(),
        output_head: Some("docs".into()),
        output_repo_path: "site".into(),
        clone_depth: SyncSettings::default().clone_depth,
        ..settings(&remote, &input)
    });
    assert_eq!(request.clone_depth(), Some(1));

    let first = run_shallow(&request, &host);
    reset_files(input.path(), &[("index.html", "v2")]);
    let second = run_shallow(&request, &host);

    assert!(first.head_created);
    assert!(!second.head_created);
    assert_eq!(second.previous_tip, Some(first.commit.id.clone()));
    assert_eq!(
        remote.branch_tip("docs").unwrap().to_string(),
        second.commit.id
    );
    assert_eq!(remote.read_file("docs", "site/index.html").as_deref(), Some("v2"));
    assert_eq!(remote.read_file("docs", "README.md").as_deref(), Some("hi"));
    assert_eq!(remote.commit_count("docs"), 3);
}
