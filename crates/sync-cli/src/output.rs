//! Human-readable run summary

use colored::Colorize;
use sync_core::{PublishOutcome, SyncReport};

pub fn print_report(report: &SyncReport) {
    let short = report.commit.id.get(..7).unwrap_or(report.commit.id.as_str());
    let branch = if report.head_created { "new branch" } else { "existing branch" };
    println!(
        "{} {} to {} in {} ({}; {} added, {} modified, {} deleted)",
        "Pushed".green().bold(),
        short.yellow(),
        report.head.cyan(),
        report.repository,
        branch,
        report.changes.added,
        report.changes.modified,
        report.changes.deleted,
    );

    match &report.outcome {
        PublishOutcome::Merged { base, sha, url, .. } => {
            let short = sha.get(..7).unwrap_or(sha.as_str());
            println!("{} into {} as {} {}", "Merged".green().bold(), base.cyan(), short.yellow(), url);
        }
        PublishOutcome::AlreadyMerged { base } => {
            println!("{} {} already contains {}", "Merged".green().bold(), base.cyan(), report.head);
        }
        PublishOutcome::PullRequestCreated { number, url } => {
            println!("{} #{} {}", "Opened draft pull request".green().bold(), number, url);
        }
        PublishOutcome::PullRequestAlreadyExists { number, url } => {
            println!("{} #{} {}", "Pull request already open".yellow().bold(), number, url);
        }
        PublishOutcome::Skipped => {}
    }
}
