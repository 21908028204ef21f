use crate::app::document_service::DocumentService;
use crate::domain::resolver::ResolvedPath;
use crate::infra::config::ServerConfig;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DocumentService>,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    pub cors: bool,
}

impl AppState {
    pub fn new(service: Arc<DocumentService>, config: &ServerConfig) -> Self {
        Self {
            service,
            request_timeout: config.request_timeout(),
            max_body_bytes: config.max_body_bytes,
            cors: config.cors,
        }
    }
}

/// Everything a handler needs to know about the request being served.
///
/// Built once per request and passed down explicitly.
#[derive(Debug)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    /// `None` when the URL path cannot name anything under the entry root.
    pub resolved: Option<ResolvedPath>,
}

/// A successful reply plus the filesystem path it touched (for the access log).
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
    pub path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ReplyBody {
    Json(JsonValue),
    Empty,
}

impl Reply {
    pub fn json(body: JsonValue, path: impl Into<PathBuf>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ReplyBody::Json(body),
            path: Some(path.into()),
        }
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ReplyBody::Empty,
            path: Some(path.into()),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Json(value) => (self.status, Json(value)).into_response(),
            ReplyBody::Empty => (
                self.status,
                [(axum::http::header::CONTENT_TYPE, "text/plain")],
            )
                .into_response(),
        }
    }
}
