//! Error types for sync-host

/// Result type for sync-host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the repository host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host answered with a non-success status
    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response body did not have the expected shape
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl Error {
    /// HTTP status, when the host responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The host reported a merge conflict.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
