use crate::transport::http::error::{ApiError, ApiResult};
use crate::transport::http::types::RequestContext;
use axum::body::Body;
use axum::http::StatusCode;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Buffers the whole request body and parses it as one JSON value.
///
/// The body is parsed once, after the last chunk has arrived, regardless of
/// how the client or the network split it.
pub async fn read_json_body(body: Body, limit: usize) -> ApiResult<JsonValue> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read body: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::bad_request(format!("body is not valid JSON: {}", e)))
}

/// One access-log line per reply.
pub fn log_reply(ctx: &RequestContext, status: StatusCode, path: Option<&Path>) {
    let path = path.map(|p| p.display().to_string()).unwrap_or_default();
    if status.is_server_error() {
        tracing::error!(method = %ctx.method, uri = %ctx.uri, status = status.as_u16(), path = %path, "->");
    } else if status.is_client_error() {
        tracing::warn!(method = %ctx.method, uri = %ctx.uri, status = status.as_u16(), path = %path, "->");
    } else {
        tracing::info!(method = %ctx.method, uri = %ctx.uri, status = status.as_u16(), path = %path, "->");
    }
}
