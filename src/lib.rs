pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::document_service::DocumentService;
pub use domain::resolver::{PathKind, ResolvedPath};
pub use infra::config::ServerConfig;
pub use storage::{StoreError, RECORD_EXTENSION};
