use axum::extract::{Multipart, State};
use axum::Json;
use bytes::BytesMut;
use chrono::Utc;
use std::sync::Arc;

use super::catalog::{software_to_response, SoftwareResponse};
use crate::api::extract::RequireUser;
use crate::api::response::{ApiError, JSend};
use crate::storage::models::SoftwareRecord;
use crate::AppState;

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_software(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    mut multipart: Multipart,
) -> Result<Json<JSend<SoftwareResponse>>, ApiError> {
    let mut file_data: Option<BytesMut> = None;
    let mut file_name: Option<String> = None;
    let mut thumb_data: Option<BytesMut> = None;
    let mut thumb_name: Option<String> = None;
    let mut thumb_content_type: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category: Option<String> = None;
    let mut version: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut is_featured = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

                if data.len() as u64 > state.config.uploads.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.uploads.max_upload_size
                    )));
                }

                let mut buf = BytesMut::with_capacity(data.len());
                buf.extend_from_slice(&data);
                file_data = Some(buf);
            }
            "thumbnail" => {
                thumb_name = field.file_name().map(|s| s.to_string());
                thumb_content_type = field.content_type().map(|s| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read thumbnail: {e}"))
                })?;

                let mut buf = BytesMut::with_capacity(data.len());
                buf.extend_from_slice(&data);
                thumb_data = Some(buf);
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid title: {e}")))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid description: {e}")))?,
                );
            }
            "category" => {
                category = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid category: {e}")))?,
                );
            }
            "version" => {
                version = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid version: {e}")))?,
                );
            }
            "tags" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid tags: {e}")))?;
                tags = text
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            "is_featured" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid is_featured: {e}")))?;
                is_featured = matches!(text.trim(), "true" | "1" | "on");
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // All validation happens before anything is written to object storage.
    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let file_name =
        file_name.ok_or_else(|| ApiError::bad_request("file field must include a file name"))?;
    let title = title.ok_or_else(|| ApiError::bad_request("title field is required"))?;
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    let category = category.ok_or_else(|| ApiError::bad_request("category field is required"))?;
    if category.trim().is_empty() {
        return Err(ApiError::bad_request("category must not be empty"));
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::bad_request("file name has no extension"))?;
    if !state.config.extension_allowed(&extension) {
        return Err(ApiError::bad_request(format!(
            "File extension '{extension}' is not allowed (allowed: {})",
            state.config.uploads.allowed_extensions.join(", ")
        )));
    }

    if thumb_data.is_some()
        && !is_image_upload(thumb_content_type.as_deref(), thumb_name.as_deref())
    {
        return Err(ApiError::bad_request("thumbnail must be an image"));
    }

    let file_size = file_data.len() as u64;
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    // Phase 1: upload the artifact. Failure here aborts the whole request.
    let software_bucket = &state.config.storage.software_bucket;
    let file_key = object_key("software", &extension);
    state
        .object_store
        .put(software_bucket, &file_key, file_data.freeze())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;
    let file_url = state.object_store.public_url(software_bucket, &file_key);

    // Phase 2: upload the thumbnail. Failure is tolerated and leaves the
    // record without one.
    let images_bucket = &state.config.storage.images_bucket;
    let mut thumb_key: Option<String> = None;
    let thumbnail_url = match thumb_data {
        Some(data) => {
            let extension =
                thumbnail_extension(thumb_name.as_deref(), thumb_content_type.as_deref());
            let key = object_key("thumbnails", &extension);
            match state
                .object_store
                .put(images_bucket, &key, data.freeze())
                .await
            {
                Ok(()) => {
                    let url = state.object_store.public_url(images_bucket, &key);
                    thumb_key = Some(key);
                    Some(url)
                }
                Err(e) => {
                    tracing::warn!(
                        software_id = %id,
                        error = %e,
                        "Failed to store thumbnail, continuing without one"
                    );
                    None
                }
            }
        }
        None => None,
    };

    // Phase 3: write the metadata row.
    let record = SoftwareRecord {
        id: id.clone(),
        created_at: now,
        title,
        description: description.unwrap_or_default(),
        category,
        version: version.unwrap_or_default(),
        file_url,
        file_size,
        thumbnail_url,
        download_count: 0,
        tags,
        is_featured,
        author_id: user.profile.id.clone(),
    };

    if let Err(e) = state.db.put_software(&record) {
        // Best-effort cleanup of the uploaded blobs
        let _ = state.object_store.delete(software_bucket, &file_key).await;
        if let Some(ref key) = thumb_key {
            let _ = state.object_store.delete(images_bucket, key).await;
        }
        return Err(ApiError::internal(e.to_string()));
    }

    tracing::debug!(software_id = %id, title = %record.title, "Created software");

    Ok(JSend::success(software_to_response(&record)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Storage key of the form `{prefix}/{millis}-{random}.{extension}`, so
/// repeated uploads of the same file name never collide.
fn object_key(prefix: &str, extension: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}/{millis}-{}.{extension}", &random[..8])
}

fn is_image_upload(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        if ct != "application/octet-stream" {
            return ct.starts_with("image/");
        }
    }
    file_name
        .and_then(|n| mime_guess::from_path(n).first())
        .map(|m| m.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

fn thumbnail_extension(file_name: Option<&str>, content_type: Option<&str>) -> String {
    file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .or_else(|| {
            content_type
                .and_then(|ct| ct.strip_prefix("image/"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "png".to_string())
}
