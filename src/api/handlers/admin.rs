use axum::extract::{Path, State};
use axum::Json;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::auth::{profile_to_response, ProfileResponse};
use super::auth_error;
use super::catalog::{software_to_response, SoftwareResponse};
use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::auth;
use crate::storage::models::Patch;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateSoftwareRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct DailyStatsParams {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub recent_uploads: u64,
    pub total_categories: u64,
    pub total_downloads: u64,
    pub total_software: u64,
}

#[derive(Debug, Serialize)]
pub struct DailyStatResponse {
    pub date: String,
    pub downloads: u64,
    pub uploads: u64,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub allowed_extensions: Vec<String>,
    pub max_upload_size: u64,
    pub site_description: String,
    pub site_name: String,
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn update_software(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateSoftwareRequest>,
) -> Result<Json<JSend<SoftwareResponse>>, ApiError> {
    let thumbnail_url = Patch::from(req.thumbnail_url);

    // Validate at least one field is provided
    if req.category.is_none()
        && req.description.is_none()
        && req.is_featured.is_none()
        && req.tags.is_none()
        && req.title.is_none()
        && req.version.is_none()
        && thumbnail_url.is_absent()
    {
        return Err(ApiError::bad_request(
            "at least one field (category, description, is_featured, tags, thumbnail_url, title, version) must be provided",
        ));
    }

    if let Some(ref title) = req.title {
        if title.trim().is_empty() {
            return Err(ApiError::bad_request("title must not be empty"));
        }
    }
    if let Some(ref category) = req.category {
        if category.trim().is_empty() {
            return Err(ApiError::bad_request("category must not be empty"));
        }
    }

    // Verify the entry exists
    state
        .db
        .get_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Software not found"))?;

    let updated = state
        .db
        .update_software(
            &id,
            req.title.as_deref(),
            req.description.as_deref(),
            req.category.as_deref(),
            req.version.as_deref(),
            req.tags.as_deref(),
            req.is_featured,
            thumbnail_url,
        )
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !updated {
        return Err(ApiError::not_found("Software not found"));
    }

    let software = state
        .db
        .get_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::internal("Software not found after update"))?;

    tracing::debug!(software_id = %id, "Updated software");
    Ok(JSend::success(software_to_response(&software)))
}

pub async fn delete_software(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let software = state
        .db
        .get_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Software not found"))?;

    state
        .db
        .delete_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    // Best-effort blob cleanup; the catalog row is already gone.
    let software_bucket = &state.config.storage.software_bucket;
    if let Some(key) = object_key_from_url(&software.file_url, software_bucket) {
        if let Err(e) = state.object_store.delete(software_bucket, key).await {
            tracing::warn!(
                software_id = %id,
                error = %e,
                "Failed to delete artifact from object storage"
            );
        }
    }
    if let Some(ref thumbnail_url) = software.thumbnail_url {
        let images_bucket = &state.config.storage.images_bucket;
        if let Some(key) = object_key_from_url(thumbnail_url, images_bucket) {
            if let Err(e) = state.object_store.delete(images_bucket, key).await {
                tracing::warn!(
                    software_id = %id,
                    error = %e,
                    "Failed to delete thumbnail from object storage"
                );
            }
        }
    }

    tracing::debug!(software_id = %id, "Deleted software");
    Ok(JSend::success(()))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<ProfileResponse>>>, ApiError> {
    let profiles = state
        .db
        .list_profiles()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(
        profiles.iter().map(profile_to_response).collect(),
    ))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<Json<JSend<ProfileResponse>>, ApiError> {
    let email = req.email.trim();
    if !email.contains('@') {
        return Err(ApiError::bad_request("email must be a valid address"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::bad_request(
            "password must be at least 6 characters",
        ));
    }
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }

    let profile = auth::create_user(&state.db, email, &req.password, username, req.is_admin)
        .map_err(auth_error)?
        .ok_or_else(|| ApiError::conflict(format!("email '{email}' is already registered")))?;

    tracing::debug!(profile_id = %profile.id, "Created user");
    Ok(JSend::success(profile_to_response(&profile)))
}

pub async fn set_user_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<SetAdminRequest>,
) -> Result<Json<JSend<ProfileResponse>>, ApiError> {
    let updated = state
        .db
        .set_profile_admin(&id, req.is_admin)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !updated {
        return Err(ApiError::not_found("Profile not found"));
    }

    let profile = state
        .db
        .get_profile(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::internal("Profile not found after update"))?;

    tracing::debug!(profile_id = %id, is_admin = req.is_admin, "Set admin flag");
    Ok(JSend::success(profile_to_response(&profile)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state
        .db
        .delete_profile(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !deleted {
        return Err(ApiError::not_found("Profile not found"));
    }

    tracing::debug!(profile_id = %id, "Deleted user");
    Ok(JSend::success(()))
}

pub async fn stats_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<OverviewResponse>>, ApiError> {
    let stats = state
        .db
        .catalog_stats(Duration::days(7))
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(OverviewResponse {
        recent_uploads: stats.recent_uploads,
        total_categories: stats.total_categories,
        total_downloads: stats.total_downloads,
        total_software: stats.total_software,
    }))
}

pub async fn stats_daily(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<DailyStatsParams>,
) -> Result<Json<JSend<Vec<DailyStatResponse>>>, ApiError> {
    let days = params.days.clamp(1, 365);
    let stats = state
        .db
        .daily_stats(days)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(
        stats
            .into_iter()
            .map(|s| DailyStatResponse {
                date: s.date.to_string(),
                downloads: s.downloads,
                uploads: s.uploads,
            })
            .collect(),
    ))
}

pub async fn settings(State(state): State<Arc<AppState>>) -> Json<JSend<SettingsResponse>> {
    JSend::success(SettingsResponse {
        allowed_extensions: state.config.uploads.allowed_extensions.clone(),
        max_upload_size: state.config.uploads.max_upload_size,
        site_description: state.config.site.description.clone(),
        site_name: state.config.site.name.clone(),
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Recover the storage key from a public URL by locating the bucket segment.
/// Returns `None` when the URL was not produced by the configured store.
fn object_key_from_url<'a>(url: &'a str, bucket: &str) -> Option<&'a str> {
    let marker = format!("/{bucket}/");
    url.find(&marker)
        .map(|idx| &url[idx + marker.len()..])
        .filter(|key| !key.is_empty())
}
