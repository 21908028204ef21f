pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod dispatch;
    pub mod records;
}

pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use types::{AppState, RequestContext};
