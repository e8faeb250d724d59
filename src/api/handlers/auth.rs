use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth_error;
use crate::api::extract::{MaybeUser, RequireUser};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth;
use crate::storage::models::{ProfileRecord, Theme};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub id: String,
    pub is_admin: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub profile: ProfileResponse,
    /// Opaque bearer token for subsequent requests.
    pub token: String,
}

/// Session lookup result. An absent or expired session is not an error;
/// profile is simply null.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub profile: Option<ProfileResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SetThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<JSend<SignInResponse>>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let (token, profile) = auth::sign_in(
        &state.db,
        &req.email,
        &req.password,
        state.config.session_ttl,
    )
    .map_err(auth_error)?;

    tracing::debug!(profile_id = %profile.id, "Signed in");

    Ok(JSend::success(SignInResponse {
        profile: profile_to_response(&profile),
        token,
    }))
}

/// Sign-out always succeeds; a missing or already-dead session has nothing
/// left to revoke.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<JSend<()>>, ApiError> {
    if let Some(user) = user {
        state
            .db
            .delete_session(&user.token_digest)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        tracing::debug!(profile_id = %user.profile.id, "Signed out");
    }

    Ok(JSend::success(()))
}

pub async fn current_session(MaybeUser(user): MaybeUser) -> Json<JSend<SessionResponse>> {
    JSend::success(SessionResponse {
        profile: user.map(|u| profile_to_response(&u.profile)),
    })
}

pub async fn get_theme(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Json<JSend<ThemeResponse>>, ApiError> {
    let theme = state
        .db
        .get_theme(&user.profile.id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .unwrap_or_default();

    Ok(JSend::success(ThemeResponse { theme }))
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    AppJson(req): AppJson<SetThemeRequest>,
) -> Result<Json<JSend<ThemeResponse>>, ApiError> {
    state
        .db
        .set_theme(&user.profile.id, req.theme)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(ThemeResponse { theme: req.theme }))
}

// ============================================================================
// Helpers
// ============================================================================

pub fn profile_to_response(profile: &ProfileRecord) -> ProfileResponse {
    ProfileResponse {
        avatar_url: profile.avatar_url.clone(),
        created_at: profile.created_at.to_rfc3339(),
        id: profile.id.clone(),
        is_admin: profile.is_admin,
        username: profile.username.clone(),
    }
}
