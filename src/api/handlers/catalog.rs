use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery, JSend};
use crate::catalog;
use crate::storage::models::SoftwareRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SoftwareResponse {
    pub author_id: String,
    pub category: String,
    pub created_at: String,
    pub description: String,
    pub download_count: u64,
    pub file_size: u64,
    pub file_url: String,
    pub id: String,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub title: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct ListSoftwareParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub count: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub download_count: u64,
    pub file_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List the catalog, newest first, narrowed by the optional category,
/// free-text query, and limit parameters.
pub async fn list_software(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListSoftwareParams>,
) -> Result<Json<JSend<Vec<SoftwareResponse>>>, ApiError> {
    let records = state
        .db
        .list_software()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let filtered = catalog::filter_software(
        records,
        params.category.as_deref(),
        params.q.as_deref(),
        params.limit.map(|l| l as usize),
    );

    Ok(JSend::success(
        filtered.iter().map(software_to_response).collect(),
    ))
}

pub async fn get_software(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<SoftwareResponse>>, ApiError> {
    let software = state
        .db
        .get_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Software not found"))?;

    Ok(JSend::success(software_to_response(&software)))
}

/// Record a download: bump the counter server-side and hand back the
/// artifact URL the client should fetch.
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<DownloadResponse>>, ApiError> {
    let software = state
        .db
        .get_software(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Software not found"))?;

    let download_count = state
        .db
        .increment_download_count(&id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Software not found"))?;

    tracing::debug!(software_id = %id, download_count, "Recorded download");

    Ok(JSend::success(DownloadResponse {
        download_count,
        file_url: software.file_url,
    }))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<CategoryResponse>>>, ApiError> {
    let counts = state
        .db
        .category_counts()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(
        counts
            .into_iter()
            .map(|(name, count)| CategoryResponse { count, name })
            .collect(),
    ))
}

/// Everything in one category. The exact name is tried first; when nothing
/// matches, a case-insensitive pass catches links that lost their casing.
pub async fn category_software(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<JSend<Vec<SoftwareResponse>>>, ApiError> {
    let records = state
        .db
        .list_software()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let exact = catalog::filter_software(records.clone(), Some(&name), None, None);
    let matched = if exact.is_empty() {
        catalog::filter_by_category_ci(records, &name)
    } else {
        exact
    };

    Ok(JSend::success(
        matched.iter().map(software_to_response).collect(),
    ))
}

// ============================================================================
// Helpers
// ============================================================================

pub fn software_to_response(software: &SoftwareRecord) -> SoftwareResponse {
    SoftwareResponse {
        author_id: software.author_id.clone(),
        category: software.category.clone(),
        created_at: software.created_at.to_rfc3339(),
        description: software.description.clone(),
        download_count: software.download_count,
        file_size: software.file_size,
        file_url: software.file_url.clone(),
        id: software.id.clone(),
        is_featured: software.is_featured,
        tags: software.tags.clone(),
        thumbnail_url: software.thumbnail_url.clone(),
        title: software.title.clone(),
        version: software.version.clone(),
    }
}
