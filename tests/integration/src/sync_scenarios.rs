//! Full-pipeline runs against a local bare remote and an in-memory host.

mod common;

use pretty_assertions::assert_eq;
use sync_core::{Error, PublishOutcome, SyncSettings};
use sync_host::NewPullRequest;
use sync_test_utils::git::BareRemote;
use sync_test_utils::host::{FakeHost, HostCall};
use sync_test_utils::tree::{input_tree, reset_files};

use common::{context_at, instant, request, run, settings};

#[test]
fn create_path_pushes_new_branch_and_opens_draft() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "<h1>v1</h1>")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        pr_base: Some("develop".into()),
        ..settings(&remote, &input)
    });

    let report = run(&request, &host).unwrap();

    assert_eq!(report.head, "auto/sync/20240305T140709Z");
    assert!(report.head_created);
    assert_eq!(report.previous_tip, None);
    assert_eq!(
        remote.branch_tip(&report.head).unwrap().to_string(),
        report.commit.id
    );
    assert_eq!(
        remote.read_file(&report.head, "index.html").as_deref(),
        Some("<h1>v1</h1>")
    );
    assert_eq!(remote.tip_message(&report.head).as_deref(), Some("Sync app/main"));

    // branched from the base tip
    let tip = remote
        .repo()
        .find_commit(remote.branch_tip(&report.head).unwrap())
        .unwrap();
    assert_eq!(tip.parent_id(0).unwrap(), remote.branch_tip("develop").unwrap());
    assert_eq!(tip.author().name(), Some("ci-bot"));
    assert_eq!(tip.author().email(), Some("ci-bot@users.noreply.github.com"));
    assert_eq!(tip.author().when().seconds(), instant(9).timestamp());

    let owner = &request.repo().owner;
    assert_eq!(
        host.calls(),
        vec![
            HostCall::AuthenticatedUser,
            HostCall::ListPullRequests {
                head: format!("{owner}:{}", report.head),
                base: "develop".into(),
            },
            HostCall::CreatePullRequest(NewPullRequest {
                title: "Sync app/main".into(),
                head: report.head.clone(),
                base: "develop".into(),
                body: "Sync".into(),
                draft: true,
            }),
        ]
    );
    assert!(matches!(
        report.outcome,
        PublishOutcome::PullRequestCreated { number: 1, .. }
    ));
}

#[test]
fn reuse_path_appends_to_existing_head() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let previous = remote.commit("docs", &[("index.html", "old")], "previous sync");
    let input = input_tree(&[("index.html", "new")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        ..settings(&remote, &input)
    });

    let report = run(&request, &host).unwrap();

    assert!(!report.head_created);
    assert_eq!(report.previous_tip, Some(previous.to_string()));
    assert_eq!(remote.commit_count("docs"), 2);
    let tip = remote
        .repo()
        .find_commit(remote.branch_tip("docs").unwrap())
        .unwrap();
    assert_eq!(tip.parent_id(0).unwrap(), previous);
    assert_eq!(remote.read_file("docs", "index.html").as_deref(), Some("new"));
    // the existing head's tree is the starting point, not the base
    assert_eq!(remote.read_file("docs", "README.md"), None);
    assert_eq!(report.changes.modified, 1);
    assert_eq!(report.outcome, PublishOutcome::Skipped);
}

#[test]
fn missing_remote_head_is_created_from_base() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("a.txt", "a")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("never-pushed".into()),
        ..settings(&remote, &input)
    });

    let report = run(&request, &host).unwrap();

    assert!(report.head_created);
    assert_eq!(remote.read_file("never-pushed", "a.txt").as_deref(), Some("a"));
}

#[test]
fn open_pull_request_is_not_duplicated() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        pr_base: Some("develop".into()),
        ..settings(&remote, &input)
    });
    let host = FakeHost::new("ci-bot").with_open_pull_request(&request.repo().owner, "docs", "develop");

    let report = run(&request, &host).unwrap();

    assert_eq!(
        report.outcome,
        PublishOutcome::PullRequestAlreadyExists {
            number: 1,
            url: host.open_pull_requests()[0].html_url.clone(),
        }
    );
    assert_eq!(host.open_pull_requests().len(), 1);
    // the branch was still pushed
    assert_eq!(remote.read_file("docs", "index.html").as_deref(), Some("v1"));
}

#[test]
fn repeated_runs_keep_one_pull_request() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        pr_base: Some("develop".into()),
        ..settings(&remote, &input)
    });

    let first = run(&request, &host).unwrap();
    reset_files(input.path(), &[("index.html", "v2")]);
    let second = run(&request, &host).unwrap();

    assert!(matches!(first.outcome, PublishOutcome::PullRequestCreated { .. }));
    assert!(matches!(
        second.outcome,
        PublishOutcome::PullRequestAlreadyExists { number: 1, .. }
    ));
    assert_eq!(host.open_pull_requests().len(), 1);
    assert_eq!(remote.commit_count("docs"), 3);
    assert_eq!(remote.read_file("docs", "index.html").as_deref(), Some("v2"));
}

#[test]
fn merge_base_merges_head() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    remote.commit("main", &[("README.md", "hi")], "main");
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot").with_email("bot@example.com");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        merge_base: Some("main".into()),
        ..settings(&remote, &input)
    });

    let report = run(&request, &host).unwrap();

    let PublishOutcome::Merged { base, message, .. } = &report.outcome else {
        panic!("expected a merge, got {:?}", report.outcome);
    };
    assert_eq!(base, "main");
    assert_eq!(report.base, "develop");
    assert_eq!(message, "Merge docs into main");
    assert_eq!(report.commit.author_email, "bot@example.com");
    assert_eq!(
        host.calls().last(),
        Some(&HostCall::Merge {
            head: "docs".into(),
            base: "main".into(),
        })
    );
}

#[test]
fn merge_failure_is_reported_after_push() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot").failing_merge(409, "Merge conflict");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        merge_base: Some("main".into()),
        ..settings(&remote, &input)
    });

    let err = run(&request, &host).unwrap_err();

    assert!(matches!(err, Error::Api { .. }), "got: {err:?}");
    assert!(err.to_string().contains("Merge conflict"));
    // no rollback of the push
    assert!(remote.branch_tip("docs").is_some());
}

#[test]
fn invalid_base_fails_before_copy_or_commit() {
    let remote = BareRemote::with_branch("main", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        pr_base: Some("main".into()),
        ..settings(&remote, &input)
    });

    let err = run(&request, &host).unwrap_err();

    assert!(matches!(err, Error::GitState { .. }), "got: {err:?}");
    assert!(remote.branch_tip("docs").is_none());
    assert_eq!(remote.commit_count("main"), 1);
    assert_eq!(host.calls(), vec![HostCall::AuthenticatedUser]);
}

#[test]
fn unset_head_runs_get_distinct_branches() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot");

    let mut heads = Vec::new();
    for second in [10, 11] {
        let request = sync_core::SyncRequest::from_settings_in(
            settings(&remote, &input),
            &context_at(instant(second)),
        )
        .unwrap();
        heads.push(run(&request, &host).unwrap().head);
    }

    assert_eq!(
        heads,
        vec!["auto/sync/20240305T140710Z", "auto/sync/20240305T140711Z"]
    );
    for head in &heads {
        assert!(remote.branch_tip(head).is_some());
    }
}

#[test]
fn unchanged_content_still_commits() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "same")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        output_repo_path: "site".into(),
        ..settings(&remote, &input)
    });

    run(&request, &host).unwrap();
    let second = run(&request, &host).unwrap();

    assert_eq!(second.changes, sync_core::ChangeSummary::default());
    assert_eq!(remote.commit_count("docs"), 3);
}

#[test]
fn report_serializes_for_json_output() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1")]);
    let host = FakeHost::new("ci-bot");
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        ..settings(&remote, &input)
    });

    let report = run(&request, &host).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["head"], "docs");
    assert_eq!(json["base"], "develop");
    assert_eq!(json["commit"]["id"], report.commit.id.as_str());
    assert_eq!(json["commit"]["timestamp"], "2024-03-05T14:07:09Z");
    assert_eq!(json["outcome"]["action"], "skipped");
}
