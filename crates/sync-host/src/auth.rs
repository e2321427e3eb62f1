//! Host API credentials

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// How requests to the host API authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum HostAuth {
    /// Personal access or installation token
    Token(String),

    /// Username and password, with an optional one-time password for
    /// accounts that have two-factor authentication enabled
    Basic {
        username: String,
        password: String,
        otp: Option<String>,
    },
}

impl HostAuth {
    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Self::Token(token) => format!("token {token}"),
            Self::Basic {
                username, password, ..
            } => format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
        }
    }

    /// Value of the `X-GitHub-OTP` header, if any.
    pub fn otp(&self) -> Option<&str> {
        match self {
            Self::Basic { otp: Some(otp), .. } if !otp.is_empty() => Some(otp),
            _ => None,
        }
    }
}

impl fmt::Debug for HostAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => write!(f, "Token(<redacted>)"),
            Self::Basic { username, otp, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("otp", &otp.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}
