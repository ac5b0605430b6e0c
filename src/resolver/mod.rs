//! Dependency graph validation and load planning.
//!
//! Everything here is a pure function of the manifest store: the same
//! manifests always produce the same plan or the same error.

pub mod errors;
pub mod graph;
pub mod plan;
pub mod version;

pub use errors::GraphError;
pub use graph::{build, DependencyGraph};
pub use plan::LoadPlan;
pub use version::{ConstraintError, VersionConstraint};
