//! Error types for sync-core
//!
//! Lower-level errors are wrapped into a small taxonomy at the phase that
//! hit them, together with a short description of what was being attempted.

/// Result type for sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to taxonomy variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while synchronizing and publishing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("{context}: {source}")]
    Config {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Talking to the remote repository or host failed
    #[error("{context}: {source}")]
    Network {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The destination repository is not in the expected state
    #[error("{context}: {source}")]
    GitState {
        context: String,
        #[source]
        source: BoxError,
    },

    /// A host API request for a merge or pull request failed
    #[error("{context}: {source}")]
    Api {
        context: String,
        #[source]
        source: sync_host::Error,
    },

    /// Malformed user input
    #[error("{context}: {source}")]
    Input {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Mirroring the input tree failed
    #[error("{context}: {source}")]
    Fs {
        context: String,
        #[source]
        source: sync_fs::Error,
    },
}

impl Error {
    pub fn config(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Config {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn network(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn git_state(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::GitState {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn input(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Input {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn api(context: impl Into<String>, source: sync_host::Error) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }

    pub fn fs(context: impl Into<String>, source: sync_fs::Error) -> Self {
        Self::Fs {
            context: context.into(),
            source,
        }
    }

    /// Wrap a git error: transport failures are network errors, everything
    /// else describes repository state.
    pub fn from_git(context: impl Into<String>, source: sync_git::Error) -> Self {
        match source {
            sync_git::Error::Fs(fs) => Self::fs(context, fs),
            e if e.is_transport() => Self::network(context, e),
            e => Self::git_state(context, e),
        }
    }

    /// Wrap a host API error: an unreachable host is a network error, any
    /// response the host sent back is an API error.
    pub fn from_host(context: impl Into<String>, source: sync_host::Error) -> Self {
        match source {
            sync_host::Error::Transport { .. } => Self::network(context, source),
            source => Self::api(context, source),
        }
    }

    /// Short name of the error kind, for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Network { .. } => "network",
            Self::GitState { .. } => "git-state",
            Self::Api { .. } => "api",
            Self::Input { .. } => "input",
            Self::Fs { .. } => "fs",
        }
    }
}
