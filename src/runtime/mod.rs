//! Runtime: attaching packages and resolving symbol references.

pub mod engine;
pub mod errors;
pub mod resolve;
pub mod search_path;

pub use engine::{CallTrace, Engine};
pub use errors::{ResolutionError, RuntimeError};
pub use resolve::{Context, Resolver};
pub use search_path::{AttachedPackage, SearchPath};
