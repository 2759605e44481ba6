//! Request extractors.

use super::AppState;
use crate::auth::bearer_or_cookie;
use crate::error::ServiceError;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

/// The authenticated caller, resolved from a bearer token or the access-token cookie.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let cookie = parts.headers.get(COOKIE).and_then(|h| h.to_str().ok());

        let token = bearer_or_cookie(authorization, cookie, &state.cookie_name)?;
        let claims = state.tokens.verify(token)?;

        Ok(Actor {
            user_id: claims.sub,
            username: claims.username,
        })
    }
}
