//! Dispatcher error taxonomy and its HTTP mapping.
//!
//! Every failure ends here and becomes a `text/plain` reply; none of them
//! escapes the request.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::storage::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, too large or not a JSON value.
    #[error("400 Bad request")]
    BadRequest { reason: String },

    /// Path names neither a record nor a collection, or the method does not
    /// apply to what it names.
    #[error("404 Not Found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn bad_request(reason: impl ToString) -> Self {
        ApiError::BadRequest {
            reason: reason.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        match self {
            ApiError::Store(err) => err.path().cloned(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain")],
            format!("{}\n", self),
        )
            .into_response()
    }
}
