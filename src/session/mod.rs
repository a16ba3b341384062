//! The identity the directory store scopes every request to.
//!
//! How the token is obtained (login form, cookie, config file) is the caller's
//! concern. The session only holds the current value.

use derive_more::{Display, From};

/// Opaque per-user numeric identity.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityToken(pub i64);

impl IdentityToken {
    /// Value of the identity header. The store only knows non-negative uids.
    pub fn header_value(&self) -> String {
        self.0.unsigned_abs().to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<IdentityToken>,
}

impl Session {
    pub fn new(token: Option<IdentityToken>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<IdentityToken> {
        self.token
    }

    /// Replaces the current identity and reports whether it changed.
    pub fn set_token(&mut self, token: Option<IdentityToken>) -> bool {
        let changed = self.token != token;
        self.token = token;
        changed
    }
}
