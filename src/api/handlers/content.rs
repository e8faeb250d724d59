use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

/// Serve object content from one of the configured buckets.
/// Route: GET /files/:bucket/*key
pub async fn serve_object(
    State(state): State<Arc<AppState>>,
    axum::extract::Path((bucket, key)): axum::extract::Path<(String, String)>,
) -> Result<Response, ApiError> {
    // Only the two configured buckets are reachable over HTTP.
    if bucket != state.config.storage.software_bucket
        && bucket != state.config.storage.images_bucket
    {
        return Err(ApiError::not_found("Not found"));
    }

    if key.split('/').any(|segment| segment == "..") {
        return Err(ApiError::bad_request("Invalid object key"));
    }

    let data = state
        .object_store
        .get(&bucket, &key)
        .await
        .map_err(|e| match e {
            crate::object_store::ObjectStoreError::NotFound(_) => {
                ApiError::not_found("Object not found")
            }
            _ => ApiError::internal(format!("Failed to retrieve object: {e}")),
        })?;

    let byte_size = data.len() as u64;
    let mime_type = mime_guess::from_path(&key).first_or_octet_stream();

    // Build response with appropriate headers
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(byte_size));

    // Set Content-Disposition with filename from the key's last segment
    let filename = key.rsplit('/').next().unwrap_or(&key);
    if let Ok(value) = format!("inline; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Objects are immutable once written, only catalog metadata changes
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
