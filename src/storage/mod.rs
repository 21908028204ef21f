//! On-disk record storage: one JSON file per record, one directory per collection.

pub mod collection;
pub mod document;
pub mod error;
pub mod ids;

pub use error::{StoreError, StoreResult};
pub use ids::CreatedRecord;

/// Extension of every record file.
pub const RECORD_EXTENSION: &str = ".json";
