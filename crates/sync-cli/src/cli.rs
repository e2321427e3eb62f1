//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use sync_core::{CredentialSet, SyncSettings};
use sync_host::DEFAULT_API_URL;

/// Mirror a build artifact directory into a branch of a GitHub repository,
/// force-push it, then merge it or open a draft pull request.
#[derive(Parser, Debug)]
#[command(name = "artifact-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Commit message [default: "Sync <CI_PROJECT_NAME or cwd>/<CI_COMMIT_REF_NAME>"]
    #[arg(long)]
    pub message: Option<String>,

    /// Directory whose contents are published
    #[arg(long, default_value = ".")]
    pub input_path: PathBuf,

    /// Destination repository URL
    #[arg(long)]
    pub output_repo: String,

    /// Directory inside the destination repository to replace
    #[arg(long, default_value = ".")]
    pub output_repo_path: String,

    /// Branch the head branch is created from
    #[arg(long, default_value = "develop")]
    pub output_base: String,

    /// Branch to push [default: auto/sync/<UTC timestamp>]
    #[arg(long)]
    pub output_head: Option<String>,

    /// Open a draft pull request into this branch
    #[arg(long, value_name = "BASE")]
    pub pr: Option<String>,

    /// Merge the head branch into this branch
    #[arg(long, value_name = "BASE")]
    pub merge: Option<String>,

    /// Pull request description
    #[arg(long, default_value = "Sync")]
    pub pr_body: String,

    /// Commit date: "now" or an RFC 3339 timestamp
    #[arg(long, default_value = "now")]
    pub commit_timestamp: String,

    /// GitHub username for basic authentication
    #[arg(long)]
    pub github_username: Option<String>,

    /// GitHub password for basic authentication
    #[arg(long)]
    pub github_password: Option<String>,

    /// One-time password for basic authentication
    #[arg(long)]
    pub github_otp: Option<String>,

    /// GitHub access token; preferred over username/password
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Clone depth; 0 fetches full history
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            message: self.message.clone(),
            input_path: self.input_path.clone(),
            output_repo: self.output_repo.clone(),
            output_repo_path: self.output_repo_path.clone(),
            output_base: self.output_base.clone(),
            output_head: self.output_head.clone(),
            pr_base: self.pr.clone(),
            merge_base: self.merge.clone(),
            pr_body: self.pr_body.clone(),
            commit_timestamp: self.commit_timestamp.clone(),
            credentials: CredentialSet {
                token: self.github_token.clone(),
                username: self.github_username.clone(),
                password: self.github_password.clone(),
                otp: self.github_otp.clone(),
            },
            api_url: self.api_url.clone(),
            clone_depth: self.depth,
        }
    }
}
