//! Access credentials passed through to the request signer.

use std::fmt;

/// An OAuth access token and secret.
///
/// The secret is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredentials {
    /// Access token.
    pub token: String,
    /// Access token secret.
    pub secret: String,
}

impl AccessCredentials {
    /// Create credentials from a token and secret.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        AccessCredentials {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for AccessCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredentials")
            .field("token", &self.token)
            .field("secret", &"<redacted>")
            .finish()
    }
}
