//! Credential resolution
//!
//! A [`CredentialSet`] holds whatever the caller supplied; [`CredentialSet::resolve`]
//! turns it into exactly one [`Credential`], which has a view for the git
//! transport and one for the host API.

use std::fmt;

use sync_git::GitAuth;
use sync_host::HostAuth;

use crate::{Error, Result};

/// Username git hosts accept alongside an access token.
pub const TOKEN_USERNAME: &str = "x-access-token";

/// Raw credential inputs. Empty strings count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub otp: Option<String>,
}

impl CredentialSet {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }

    /// Pick one authentication scheme. A token wins over username/password.
    pub fn resolve(&self) -> Result<Credential> {
        const CONTEXT: &str = "resolve credentials";

        if let Some(token) = present(&self.token) {
            if present(&self.username).is_some() || present(&self.password).is_some() {
                tracing::debug!("Both token and username/password given; using the token");
            }
            return Ok(Credential::Token(token.to_string()));
        }

        match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => Ok(Credential::Basic {
                username: username.to_string(),
                password: password.to_string(),
                otp: present(&self.otp).map(str::to_string),
            }),
            (Some(_), None) => Err(Error::config(CONTEXT, "a username was given without a password")),
            (None, Some(_)) => Err(Error::config(CONTEXT, "a password was given without a username")),
            (None, None) => Err(Error::config(
                CONTEXT,
                "no token or username/password was given",
            )),
        }
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("otp", &self.otp.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The authentication scheme chosen for a run.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Token(String),
    Basic {
        username: String,
        password: String,
        otp: Option<String>,
    },
}

impl Credential {
    /// Credentials for clone, fetch and push. The OTP plays no part here.
    pub fn git_auth(&self) -> GitAuth {
        match self {
            Self::Token(token) => GitAuth::user_pass(TOKEN_USERNAME, token.clone()),
            Self::Basic {
                username, password, ..
            } => GitAuth::user_pass(username.clone(), password.clone()),
        }
    }

    /// Credentials for host API requests.
    pub fn host_auth(&self) -> HostAuth {
        match self {
            Self::Token(token) => HostAuth::Token(token.clone()),
            Self::Basic {
                username,
                password,
                otp,
            } => HostAuth::Basic {
                username: username.clone(),
                password: password.clone(),
                otp: otp.clone(),
            },
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Token(_) => "token",
            Self::Basic { .. } => "basic",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::Basic { username, otp, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("otp", &otp.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}
