pub mod merge;
pub mod resolver;

pub use merge::shallow_merge;
pub use resolver::{PathKind, ResolvedPath};
