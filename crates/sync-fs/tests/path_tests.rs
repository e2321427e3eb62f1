use rstest::rstest;
use sync_fs::{Error, RepoRelativePath};

#[rstest]
#[case(".", "")]
#[case("", "")]
#[case("./", "")]
#[case("docs", "docs")]
#[case("docs/", "docs")]
#[case("./docs/api", "docs/api")]
#[case("docs//api/./v1", "docs/api/v1")]
#[case("docs\\api", "docs/api")]
fn test_parse_normalizes(#[case] input: &str, #[case] expected: &str) {
    let path = RepoRelativePath::parse(input).unwrap();
    assert_eq!(path.as_str(), expected);
}

#[rstest]
#[case("..")]
#[case("../outside")]
#[case("docs/../../outside")]
#[case("/etc")]
#[case("C:/Windows")]
#[case(".git")]
#[case(".git/hooks")]
fn test_parse_rejects_escapes(#[case] input: &str) {
    let err = RepoRelativePath::parse(input).unwrap_err();
    assert!(
        matches!(err, Error::PathEscape { .. }),
        "expected PathEscape for {input:?}, got {err:?}"
    );
}

#[test]
fn test_pathspec_for_subdirectory() {
    let path = RepoRelativePath::parse("site/public").unwrap();
    assert_eq!(path.pathspec(), "site/public");
    assert_eq!(path.to_string(), "site/public");
}

#[test]
fn test_resolve_in_accepts_missing_components() {
    let temp = tempfile::tempdir().unwrap();
    let path = RepoRelativePath::parse("not/yet/there").unwrap();
    let resolved = path.resolve_in(temp.path()).unwrap();
    assert_eq!(resolved, temp.path().join("not").join("yet").join("there"));
}

#[cfg(unix)]
#[test]
fn test_resolve_in_rejects_symlinked_component() {
    let temp = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

    let path = RepoRelativePath::parse("link/inner").unwrap();
    let err = path.resolve_in(temp.path()).unwrap_err();
    assert!(err.to_string().contains("symlink"), "got: {err}");
}
