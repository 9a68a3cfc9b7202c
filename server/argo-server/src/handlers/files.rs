use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::server::ArgoServer;
use crate::storage::{content_type_for_key, validate_object_key, StorageError};

/// Stream a stored file back to the caller.
///
/// The key is validated before any storage call: traversal attempts and
/// malformed keys are rejected with 400, unknown keys map to 404.
#[utoipa::path(
    get,
    path = "/api/v1/files/{key}",
    params(("key" = String, Path, description = "Opaque object-storage key")),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Invalid file key"),
        (status = 404, description = "File not found"),
        (status = 503, description = "Object storage not configured"),
        (status = 500, description = "Internal server error")
    ),
    tag = "files"
)]
pub async fn get_file(
    State(server): State<ArgoServer>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    if !validate_object_key(&key) {
        return Err(ApiError::bad_request("Invalid file key"));
    }

    let storage = server.storage.as_ref().ok_or(ApiError::ServiceUnavailable {
        message: "Object storage is not configured".to_string(),
    })?;

    let data = storage.download_file(&key).await.map_err(|e| match e {
        StorageError::NotFound { .. } => ApiError::not_found("file"),
        StorageError::RequestFailed(message) => ApiError::internal(message),
    })?;

    let content_type = content_type_for_key(&key);

    Ok((
        [(header::CONTENT_TYPE, content_type.to_string())],
        data,
    )
        .into_response())
}
