//! Bearer token verification port.

use thiserror::Error;

use warden_core::UserId;

/// Identity claims extracted from a verified bearer token.
///
/// Provider-issued role or group hints are never carried here; authority is
/// always re-derived from the permission graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenClaims {
    /// Authenticated subject.
    pub subject: UserId,
    /// Display username, empty when the token carries none.
    pub username: String,
    /// Optional email address.
    pub email: Option<String>,
    /// Expiry as unix seconds.
    pub expires_at: i64,
    /// Issue time as unix seconds.
    pub issued_at: Option<i64>,
}

impl AccessTokenClaims {
    /// Returns whether the token is expired at `now` (unix seconds).
    ///
    /// A token whose expiry equals `now` is already expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Reasons a bearer token is refused before any permission lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// Bad signature, unexpected algorithm, or unparseable token.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Signature verified but claims are missing or malformed.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),
}

/// Port verifying bearer token signatures and extracting identity claims.
///
/// Expiry is reported through [`AccessTokenClaims::expires_at`] and checked
/// by the caller.
pub trait AccessTokenVerifier: Send + Sync {
    /// Verifies the token and returns its identity claims.
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenRejection>;
}
