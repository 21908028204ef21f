use crate::domain::resolver::{PathKind, ResolvedPath};
use crate::transport::http::error::{ApiError, ApiResult};
use crate::transport::http::handlers::common::read_json_body;
use crate::transport::http::types::{AppState, Reply};
use axum::body::Body;
use serde_json::Value as JsonValue;

/// GET: a record, or the aggregated array of a collection.
pub async fn get_resource(state: &AppState, resolved: &ResolvedPath) -> ApiResult<Reply> {
    match resolved.kind().await {
        PathKind::File => {
            // `kind` only reports File when the record form exists.
            let file_path = resolved.file_path.as_deref().ok_or(ApiError::NotFound)?;
            let record = state.service.read_record(file_path).await?;
            Ok(Reply::json(record, file_path))
        }
        PathKind::Directory => {
            let records = state.service.read_collection(&resolved.dir_path).await?;
            Ok(Reply::json(JsonValue::Array(records), &resolved.dir_path))
        }
        PathKind::Absent => Err(ApiError::NotFound),
    }
}

/// POST: new record with a freshly allocated id.
pub async fn create(state: &AppState, resolved: &ResolvedPath, body: Body) -> ApiResult<Reply> {
    let document = read_json_body(body, state.max_body_bytes).await?;
    let created = state
        .service
        .create_record(&resolved.dir_path, document)
        .await?;
    Ok(Reply::json(created.document, created.file_path))
}

/// PUT: wholesale replacement of an existing record.
///
/// An absent record is 404 before the body is even looked at; the service
/// re-checks existence under the record's lock.
pub async fn replace(state: &AppState, resolved: &ResolvedPath, body: Body) -> ApiResult<Reply> {
    require_record(resolved).await?;
    let document = read_json_body(body, state.max_body_bytes).await?;
    match state.service.replace_record(resolved, document).await? {
        Some(stored) => Ok(Reply::json(stored, file_path_of(resolved)?)),
        None => Err(ApiError::NotFound),
    }
}

/// PATCH: shallow merge onto an existing record.
pub async fn merge(state: &AppState, resolved: &ResolvedPath, body: Body) -> ApiResult<Reply> {
    require_record(resolved).await?;
    let patch = read_json_body(body, state.max_body_bytes).await?;
    match state.service.merge_record(resolved, patch).await? {
        Some(merged) => Ok(Reply::json(merged, file_path_of(resolved)?)),
        None => Err(ApiError::NotFound),
    }
}

/// DELETE: unlink an existing record.
pub async fn delete(state: &AppState, resolved: &ResolvedPath) -> ApiResult<Reply> {
    match state.service.delete_record(resolved).await? {
        Some(removed) => Ok(Reply::empty(removed)),
        None => Err(ApiError::NotFound),
    }
}

async fn require_record(resolved: &ResolvedPath) -> ApiResult<()> {
    match resolved.existing_file().await {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound),
    }
}

fn file_path_of(resolved: &ResolvedPath) -> ApiResult<&std::path::Path> {
    resolved.file_path.as_deref().ok_or(ApiError::NotFound)
}
