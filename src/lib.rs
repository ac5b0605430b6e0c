//! Mooring - package dependency and namespace resolution
//!
//! This crate validates a set of package manifests into a load order,
//! builds each package's namespace (exports, imports, private definitions)
//! and resolves symbol references either inside a package or through the
//! search path of attached packages.

pub mod core;
pub mod namespace;
pub mod ops;
pub mod resolver;
pub mod runtime;
pub mod util;

/// Shared fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

use thiserror::Error;

use crate::namespace::NamespaceError;
use crate::resolver::GraphError;
use crate::runtime::{ResolutionError, RuntimeError};
use crate::util::Diagnostic;

pub use core::{Manifest, ManifestStore, PackageState, Workspace};
pub use namespace::NamespaceRegistry;
pub use resolver::{LoadPlan, VersionConstraint};
pub use runtime::{Context, Engine};
pub use util::context::GlobalContext;

/// Any error the engine reports.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl Error {
    /// 1 for a graph or namespace that failed validation, 2 for runtime
    /// misuse or a failed lookup.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Graph(_) | Error::Namespace(_) => 1,
            Error::Runtime(_) | Error::Resolution(_) => 2,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Graph(e) => e.to_diagnostic(),
            Error::Namespace(e) => e.to_diagnostic(),
            Error::Runtime(e) => e.to_diagnostic(),
            Error::Resolution(e) => e.to_diagnostic(),
        }
    }
}
