//! `git daemon` serving a [`BareRemote`] over `git://`.
//!
//! libgit2's local transport cannot serve shallow fetches, so tests of the
//! default clone depth go through the daemon instead. Requires the `git`
//! binary; [`GitDaemon::serve`] returns `None` when it cannot be started.

use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::git::BareRemote;

pub struct GitDaemon {
    child: Child,
    url: String,
}

impl GitDaemon {
    /// Serve `remote` read-write on a free loopback port.
    ///
    /// The URL has two path segments: the remote's temporary directory and
    /// `remote.git`.
    pub fn serve(remote: &BareRemote) -> Option<Self> {
        let repo_dir = remote.path().parent()?;
        let base = repo_dir.parent()?;
        let owner = repo_dir.file_name()?.to_str()?;
        let name = remote.path().file_name()?.to_str()?;

        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").ok()?;
            listener.local_addr().ok()?.port()
        };

        let child = Command::new("git")
            .arg("daemon")
            .arg("--reuseaddr")
            .arg("--export-all")
            .arg("--enable=receive-pack")
            .arg("--listen=127.0.0.1")
            .arg(format!("--port={port}"))
            .arg(format!("--base-path={}", base.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;

        let mut daemon = Self {
            child,
            url: format!("git://127.0.0.1:{port}/{owner}/{name}"),
        };
        for _ in 0..50 {
            if let Ok(Some(_)) = daemon.child.try_wait() {
                return None;
            }
            if TcpStream::connect(("127.0.0.1", port)).is_ok() {
                return Some(daemon);
            }
            thread::sleep(Duration::from_millis(100));
        }
        let _ = daemon.child.kill();
        None
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for GitDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
