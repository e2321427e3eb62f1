//! The pushed destination subtree equals the input tree exactly.

mod common;

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use sync_core::SyncSettings;
use sync_test_utils::git::BareRemote;
use sync_test_utils::host::FakeHost;
use sync_test_utils::tree::input_tree;

use common::{request, run, settings};

fn expected(files: &[(&str, &str)]) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
}

#[test]
fn subdirectory_is_replaced_and_siblings_kept() {
    let remote = BareRemote::with_branch(
        "develop",
        &[
            ("README.md", "hi"),
            ("public/stale.html", "stale"),
            ("public/old/deep.css", "old"),
            ("src/main.rs", "fn main() {}"),
        ],
    );
    let files = [("index.html", "<h1>v2</h1>"), ("assets/app.js", "app")];
    let input = input_tree(&files);
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        output_repo_path: "public".into(),
        ..settings(&remote, &input)
    });

    let report = run(&request, &FakeHost::new("ci-bot")).unwrap();

    assert_eq!(remote.files("docs", "public"), expected(&files));
    assert_eq!(report.changes.added, 2);
    assert_eq!(report.changes.deleted, 2);
    assert_eq!(remote.read_file("docs", "README.md").as_deref(), Some("hi"));
    assert_eq!(
        remote.read_file("docs", "src/main.rs").as_deref(),
        Some("fn main() {}")
    );
}

#[test]
fn root_destination_keeps_only_input() {
    let remote = BareRemote::with_branch(
        "develop",
        &[("README.md", "hi"), ("old/x.txt", "x")],
    );
    let files = [(".gitignore", "*.js"), ("bundle.js", "js"), ("index.html", "v1")];
    let input = input_tree(&files);
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        ..settings(&remote, &input)
    });

    run(&request, &FakeHost::new("ci-bot")).unwrap();

    // bundle.js is published even though the mirrored .gitignore matches it
    assert_eq!(remote.files("docs", ""), expected(&files));
}

#[test]
fn nested_destination_is_created() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let files = [("v1/index.html", "docs")];
    let input = input_tree(&files);
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        output_repo_path: "site/api/reference".into(),
        ..settings(&remote, &input)
    });

    run(&request, &FakeHost::new("ci-bot")).unwrap();

    assert_eq!(remote.files("docs", "site/api/reference"), expected(&files));
}

#[test]
fn nested_git_directory_in_input_is_not_published() {
    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("index.html", "v1"), (".git/HEAD", "ref: refs/heads/x")]);
    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        output_repo_path: "public".into(),
        ..settings(&remote, &input)
    });

    run(&request, &FakeHost::new("ci-bot")).unwrap();

    assert_eq!(remote.files("docs", "public"), expected(&[("index.html", "v1")]));
}

#[cfg(unix)]
#[test]
fn executable_bit_and_symlinks_survive() {
    use std::os::unix::fs::{PermissionsExt, symlink};

    let remote = BareRemote::with_branch("develop", &[("README.md", "hi")]);
    let input = input_tree(&[("bin/run.sh", "#!/bin/sh\n"), ("target.txt", "t")]);
    let script = input.path().join("bin/run.sh");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    symlink("target.txt", input.path().join("link.txt")).unwrap();

    let request = request(SyncSettings {
        output_head: Some("docs".into()),
        output_repo_path: "out".into(),
        ..settings(&remote, &input)
    });
    run(&request, &FakeHost::new("ci-bot")).unwrap();

    let tip = remote
        .repo()
        .find_commit(remote.branch_tip("docs").unwrap())
        .unwrap();
    let tree = tip.tree().unwrap();
    let script_entry = tree.get_path(std::path::Path::new("out/bin/run.sh")).unwrap();
    assert_eq!(script_entry.filemode(), i32::from(git2::FileMode::BlobExecutable));
    let link_entry = tree.get_path(std::path::Path::new("out/link.txt")).unwrap();
    assert_eq!(link_entry.filemode(), i32::from(git2::FileMode::Link));
    let link_target = remote.repo().find_blob(link_entry.id()).unwrap();
    assert_eq!(link_target.content(), b"target.txt");
}
