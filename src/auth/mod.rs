//! Credentials and access tokens.
//!
//! - Passwords are stored as PBKDF2-HMAC-SHA256 hashes ([`password`]).
//! - Logins yield HS256 JWTs whose `sub` is the user id ([`token`]).
//! - Requests present the token as `Authorization: Bearer <jwt>` or in the
//!   access-token cookie ([`bearer_or_cookie`]).

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenIssuer};

use crate::error::ServiceError;
use thiserror::Error;

/// Failures inside the credential and token machinery.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingToken,

    #[error("invalid or expired token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("stored password hash is malformed")]
    MalformedHash,
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) | AuthError::MalformedHash => ServiceError::internal(err),
            AuthError::MissingToken => ServiceError::unauthorized("Unauthorized"),
            _ => ServiceError::unauthorized("Unauthorized").with_details(err.to_string()),
        }
    }
}

/// Pull a raw token out of an `Authorization` header value or a `Cookie` header value.
///
/// The bearer header wins when both are present.
pub fn bearer_or_cookie<'a>(
    authorization: Option<&'a str>,
    cookie: Option<&'a str>,
    cookie_name: &str,
) -> Result<&'a str, AuthError> {
    if let Some(token) = authorization
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Ok(token);
    }

    cookie
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
        .ok_or(AuthError::MissingToken)
}
