pub mod document_service;
pub mod path_locks;
