//! Shared test utilities for the artifact-sync workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`daemon`] : `git daemon` serving a bare remote over `git://`
//! - [`digest`] : SHA-256 digests of directory trees
//! - [`git`] : bare remote repositories built with `git2`
//! - [`history`] : first-parent commit history of a local branch
//! - [`http`] : scripted loopback HTTP server
//! - [`host`] : [`FakeHost`](host::FakeHost), a recording in-memory host API
//! - [`tree`] : input artifact directories

pub mod daemon;
pub mod digest;
pub mod git;
pub mod history;
pub mod host;
pub mod http;
pub mod tree;
