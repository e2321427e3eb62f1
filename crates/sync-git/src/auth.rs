//! Transport credentials for remote operations

use std::fmt;

use git2::{Cred, RemoteCallbacks};

/// Credentials presented to the git transport.
#[derive(Clone, PartialEq, Eq)]
pub enum GitAuth {
    /// No credentials; relies on the transport needing none (local paths,
    /// public remotes).
    Anonymous,

    /// HTTP basic credentials. Token auth is expressed as a username with
    /// the token as password.
    UserPass { username: String, password: String },
}

impl GitAuth {
    pub fn user_pass(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UserPass {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build remote callbacks that answer credential requests once.
    ///
    /// libgit2 re-invokes the credential callback after a rejection, so a
    /// second request for the same operation is turned into an error instead
    /// of an endless retry loop.
    pub fn callbacks<'a>(&self) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();

        if let Self::UserPass { username, password } = self {
            let username = username.clone();
            let password = password.clone();
            let mut attempted = false;
            callbacks.credentials(move |_url, _username_from_url, allowed| {
                if attempted {
                    return Err(git2::Error::from_str("credentials were rejected by the remote"));
                }
                attempted = true;
                if allowed.is_user_pass_plaintext() {
                    Cred::userpass_plaintext(&username, &password)
                } else {
                    Cred::default()
                }
            });
        }

        callbacks.sideband_progress(|data| {
            let line = String::from_utf8_lossy(data);
            let line = line.trim_end();
            if !line.is_empty() {
                tracing::debug!(target: "sync_git::remote", "> {}", line);
            }
            true
        });

        callbacks
    }
}

impl fmt::Debug for GitAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
