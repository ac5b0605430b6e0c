//! Runtime errors: misuse of attach/detach and failed lookups.
//!
//! All of these are recoverable; a caller such as a REPL reports them and
//! carries on.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::PackageState;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::Name;

#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum RuntimeError {
    #[error("package `{package}` is not registered")]
    #[diagnostic(code(mooring::runtime::unknown_package))]
    UnknownPackage { package: String },

    #[error("package `{package}` is {state}, not loaded")]
    #[diagnostic(code(mooring::runtime::not_loaded))]
    NotLoaded { package: Name, state: PackageState },

    #[error("package `{package}` is not attached")]
    #[diagnostic(code(mooring::runtime::not_attached))]
    NotAttached { package: Name },

    #[error("cannot detach `{package}`: still required by attached {}", format_names(.blockers))]
    #[diagnostic(code(mooring::runtime::detach_blocked))]
    DetachBlocked { package: Name, blockers: Vec<Name> },

    #[error("package `{package}` is already loaded and cannot be re-registered")]
    #[diagnostic(code(mooring::runtime::already_loaded))]
    AlreadyLoaded { package: Name },
}

fn format_names(names: &[Name]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RuntimeError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            RuntimeError::UnknownPackage { .. } => diag.with_suggestion(suggestions::SHOW_PLAN),
            RuntimeError::NotLoaded { package, .. } => diag
                .with_context("only loaded packages can be attached or resolved against")
                .with_suggestion(format!("Load `{}` before using it", package)),
            RuntimeError::NotAttached { .. } => diag,
            RuntimeError::DetachBlocked { blockers, .. } => {
                let mut diag = diag.with_context("packages are detached in reverse order of their depends edges");
                for blocker in blockers {
                    diag = diag.with_suggestion(format!("Detach `{}` first", blocker));
                }
                diag
            }
            RuntimeError::AlreadyLoaded { .. } => diag
                .with_context("namespaces are immutable once built"),
        }
    }
}

/// A symbol reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolutionError {
    #[error("object `{symbol}` not found {where_}")]
    #[diagnostic(code(mooring::resolve::undefined_symbol))]
    UndefinedSymbol {
        symbol: String,
        /// "in package `p`" or "at top level"
        where_: String,
    },

    #[error("`{symbol}` is not an exported object of `{package}`")]
    #[diagnostic(code(mooring::resolve::not_exported))]
    NotExported {
        package: Name,
        symbol: String,
        /// The package defines the symbol but keeps it private.
        private: bool,
    },

    #[error("`{symbol}` is not exported by any attached package")]
    #[diagnostic(code(mooring::resolve::not_found))]
    NotFound { symbol: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ResolutionError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolutionError::UndefinedSymbol { symbol, .. } => Diagnostic::error(self.to_string())
                .with_suggestion(format!("Attach a package that exports `{}`", symbol))
                .with_suggestion(format!("Use a qualified reference, e.g. `pkg::{}`", symbol)),
            ResolutionError::NotExported {
                package, private, ..
            } => {
                let diag = Diagnostic::error(self.to_string());
                if *private {
                    diag.with_context(format!("it is defined in `{}` but not exported", package))
                } else {
                    diag.with_suggestion(format!("Run `mooring explain {}` to list its exports", package))
                }
            }
            ResolutionError::NotFound { .. } => Diagnostic::error(self.to_string()),
            ResolutionError::Runtime(err) => err.to_diagnostic(),
        }
    }
}
