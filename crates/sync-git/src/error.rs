//! Error types for sync-git

/// Result type for sync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] sync_fs::Error),

    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Branch '{branch}' does not exist on the remote")]
    RemoteBranchNotFound { branch: String },

    #[error("Branch '{branch}' is already up to date")]
    FetchUpToDate { branch: String },

    #[error("No matching reference for '{branch}' on the remote")]
    NoMatchingRemoteRef { branch: String },

    #[error("Failed to fetch '{branch}': {message}")]
    FetchFailed { branch: String, message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Remote rejected {reference}: {message}")]
    PushRejected { reference: String, message: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Failed to check out '{branch}': {message}")]
    CheckoutFailed { branch: String, message: String },

    #[error("Invalid branch name: {name}")]
    InvalidBranchName { name: String },

    #[error("No repository has been cloned yet")]
    NotCloned,
}

impl Error {
    /// Fetch outcomes that mean "nothing to do" rather than failure.
    ///
    /// A head branch that is already current, or that does not exist on the
    /// remote yet, must not abort a sync.
    pub fn is_benign_fetch(&self) -> bool {
        matches!(
            self,
            Self::FetchUpToDate { .. } | Self::NoMatchingRemoteRef { .. }
        )
    }

    /// Whether this error came from talking to the remote.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::CloneFailed { .. }
                | Self::FetchFailed { .. }
                | Self::PushFailed { .. }
                | Self::PushRejected { .. }
        )
    }
}
