//! The request dispatcher.
//!
//! Every request lands here: method and URL path are turned into a CRUD
//! operation against the entry root, and the outcome (success or any error)
//! into exactly one reply.
//!
//! | Method | Path names        | Result                                  |
//! |--------|-------------------|-----------------------------------------|
//! | GET    | ends in `/`       | 302 to the path without the slash       |
//! | GET    | record            | 200 record                              |
//! | GET    | collection        | 200 array of the collection's records   |
//! | POST   | anything          | 200 new record with allocated `id`      |
//! | PUT    | existing record   | 200 replaced record                     |
//! | PATCH  | existing record   | 200 shallow-merged record               |
//! | DELETE | existing record   | 200 empty                               |
//! | other  |                   | 404                                     |

use crate::domain::resolver;
use crate::transport::http::error::{ApiError, ApiResult};
use crate::transport::http::handlers::common::log_reply;
use crate::transport::http::handlers::records;
use crate::transport::http::types::{AppState, Reply, RequestContext};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Body,
) -> Response {
    // Query strings never take part in routing.
    let url_path = uri.path().to_string();

    // The redirect's Location is the bare path; clients resolve it against
    // whatever address they used, so no server URL is needed here.
    if method == Method::GET {
        if let Some(target) = resolver::redirect_target(&url_path) {
            let ctx = RequestContext {
                method,
                uri,
                resolved: None,
            };
            log_reply(&ctx, StatusCode::FOUND, None);
            return (StatusCode::FOUND, [(header::LOCATION, target.to_string())]).into_response();
        }
    }

    let ctx = RequestContext {
        resolved: state.service.resolve(&url_path),
        method,
        uri,
    };

    let outcome = match tokio::time::timeout(state.request_timeout, route(&state, &ctx, body)).await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(ApiError::Timeout(state.request_timeout)),
    };

    match outcome {
        Ok(reply) => {
            log_reply(&ctx, reply.status, reply.path.as_deref());
            reply.into_response()
        }
        Err(err) => {
            match &err {
                ApiError::BadRequest { reason } => tracing::debug!(reason = %reason, "rejected body"),
                ApiError::Store(store_err) => tracing::error!(error = %store_err, "storage failure"),
                ApiError::Timeout(_) => tracing::error!(error = %err, "request timed out"),
                ApiError::NotFound => {}
            }
            log_reply(&ctx, err.status_code(), err.path().as_deref());
            err.into_response()
        }
    }
}

async fn route(state: &AppState, ctx: &RequestContext, body: Body) -> ApiResult<Reply> {
    let Some(resolved) = ctx.resolved.as_ref() else {
        return Err(ApiError::NotFound);
    };

    match ctx.method {
        Method::GET => records::get_resource(state, resolved).await,
        Method::POST => records::create(state, resolved, body).await,
        Method::PUT => records::replace(state, resolved, body).await,
        Method::PATCH => records::merge(state, resolved, body).await,
        Method::DELETE => records::delete(state, resolved).await,
        _ => Err(ApiError::NotFound),
    }
}
