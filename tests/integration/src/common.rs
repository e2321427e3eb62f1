//! Helpers shared by the integration test binaries.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sync_core::{CredentialSet, RunContext, SyncReport, SyncRequest, SyncSettings};
use sync_git::{Git2Backend, GitAuth};
use sync_test_utils::git::BareRemote;
use sync_test_utils::host::FakeHost;
use tempfile::TempDir;

pub fn instant(seconds: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, seconds).unwrap()
}

pub fn context_at(now: DateTime<Utc>) -> RunContext {
    RunContext {
        project_name: Some("app".into()),
        ref_name: Some("main".into()),
        current_dir: None,
        now,
    }
}

/// Settings targeting `remote` with `input` as the artifact directory.
pub fn settings(remote: &BareRemote, input: &TempDir) -> SyncSettings {
    SyncSettings {
        input_path: input.path().to_path_buf(),
        output_repo: remote.file_url(),
        commit_timestamp: "2024-03-05T14:07:09Z".into(),
        credentials: CredentialSet::token("ghp_test"),
        clone_depth: 0,
        ..SyncSettings::default()
    }
}

pub fn request(settings: SyncSettings) -> SyncRequest {
    SyncRequest::from_settings_in(settings, &context_at(instant(9))).unwrap()
}

/// Full-depth backend; the local transport cannot serve shallow fetches.
pub fn backend() -> Git2Backend {
    Git2Backend::new(GitAuth::Anonymous).with_depth(None)
}

pub fn run(request: &SyncRequest, host: &FakeHost) -> sync_core::Result<SyncReport> {
    sync_core::run_with(request, backend(), host)
}
