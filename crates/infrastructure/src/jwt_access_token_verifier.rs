//! HS256 bearer token verification.

use std::str::FromStr;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use warden_application::{AccessTokenClaims, AccessTokenVerifier, TokenRejection};
use warden_core::UserId;

/// Verifies tokens signed with a shared HS256 secret.
///
/// Tokens declaring any other algorithm are rejected from the header alone,
/// before signature or claim checks run.
#[derive(Clone)]
pub struct JwtAccessTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAccessTokenVerifier {
    /// Creates a verifier for the given shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by the caller so it can report TOKEN_EXPIRED.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    #[serde(alias = "preferred_username")]
    username: Option<String>,
    email: Option<String>,
    exp: Option<i64>,
    iat: Option<i64>,
}

impl AccessTokenVerifier for JwtAccessTokenVerifier {
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenRejection> {
        let header = decode_header(token)
            .map_err(|error| TokenRejection::InvalidToken(format!("malformed header: {error}")))?;

        if header.alg != Algorithm::HS256 {
            return Err(TokenRejection::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let data = decode::<RawClaims>(token, &self.key, &self.validation).map_err(|error| {
            match error.kind() {
                ErrorKind::Json(_) => {
                    TokenRejection::InvalidClaims(format!("malformed claims: {error}"))
                }
                _ => TokenRejection::InvalidToken(error.to_string()),
            }
        })?;

        claims_from_raw(data.claims)
    }
}

fn claims_from_raw(raw: RawClaims) -> Result<AccessTokenClaims, TokenRejection> {
    let subject = raw
        .sub
        .ok_or_else(|| TokenRejection::InvalidClaims("missing subject".to_owned()))?;
    let subject = UserId::from_str(subject.as_str())
        .map_err(|_| TokenRejection::InvalidClaims("subject is not a valid user id".to_owned()))?;
    let expires_at = raw
        .exp
        .ok_or_else(|| TokenRejection::InvalidClaims("missing expiration".to_owned()))?;

    Ok(AccessTokenClaims {
        subject,
        username: raw.username.unwrap_or_default(),
        email: raw.email,
        expires_at,
        issued_at: raw.iat,
    })
}
