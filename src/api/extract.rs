use axum::http::request::Parts;
use axum::{extract::FromRequestParts, http::header};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::auth::{self, CurrentUser};
use crate::AppState;

/// Extractor for routes where a session is optional. Yields None for
/// missing, unknown, or expired tokens.
pub struct MaybeUser(pub Option<CurrentUser>);

/// Extractor for routes that require a signed-in user.
pub struct RequireUser(pub CurrentUser);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        // Guarded routes resolve the user up front and stash it in extensions
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(MaybeUser(Some(user.clone())));
        }

        let token = match bearer_token(parts) {
            Some(token) => token.to_string(),
            None => return Ok(MaybeUser(None)),
        };

        let user = auth::resolve_token(&state.db, &token)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        Ok(MaybeUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(RequireUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
