//! Namespace build errors.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::Name;

/// Error while building a package's export or import table.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum NamespaceError {
    #[error("package `{package}` exports `{symbol}` more than once")]
    #[diagnostic(code(mooring::namespace::duplicate_export))]
    DuplicateExport { package: Name, symbol: Name },

    #[error("package `{package}` imports from `{from}`, which is not one of its imports/depends dependencies")]
    #[diagnostic(code(mooring::namespace::undeclared_dependency))]
    UndeclaredDependencyImport {
        package: Name,
        from: Name,
        /// First symbol requested, `None` for a whole-package import.
        symbol: Option<Name>,
    },

    #[error("package `{package}` imports `{symbol}` from `{from}`, which does not export it")]
    #[diagnostic(code(mooring::namespace::unresolved_import))]
    UnresolvedImport {
        package: Name,
        from: Name,
        symbol: Name,
    },

    #[error("package `{package}` binds `{local}` to both `{first}` and `{second}`")]
    #[diagnostic(code(mooring::namespace::conflicting_import))]
    ConflictingImport {
        package: Name,
        local: Name,
        first: String,
        second: String,
    },

    #[error("namespace of `{package}` cannot be built: `{missing}` has not been loaded")]
    #[diagnostic(code(mooring::namespace::not_loaded))]
    MissingNamespace { package: Name, missing: Name },
}

impl NamespaceError {
    pub fn package(&self) -> Name {
        match self {
            NamespaceError::DuplicateExport { package, .. }
            | NamespaceError::UndeclaredDependencyImport { package, .. }
            | NamespaceError::UnresolvedImport { package, .. }
            | NamespaceError::ConflictingImport { package, .. }
            | NamespaceError::MissingNamespace { package, .. } => *package,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            NamespaceError::DuplicateExport { symbol, .. } => diag
                .with_context("duplicate exports are rejected, never merged")
                .with_suggestion(format!("Remove the repeated export of `{}`", symbol)),

            NamespaceError::UndeclaredDependencyImport {
                package,
                from,
                symbol,
            } => {
                let diag = match symbol {
                    Some(symbol) => diag.with_context(format!("while importing `{}`", symbol)),
                    None => diag.with_context("while importing the whole package"),
                };
                diag.with_suggestion(format!(
                    "Declare `{}` as an `imports` or `depends` dependency of `{}`",
                    from, package
                ))
            }

            NamespaceError::UnresolvedImport { from, symbol, .. } => diag
                .with_suggestion(format!("Export `{}` from `{}`", symbol, from))
                .with_suggestion("Check that the symbol name is spelled correctly"),

            NamespaceError::ConflictingImport { local, .. } => diag.with_suggestion(format!(
                "Rename one of the imports, e.g. `{{ local = \"{}2\", symbol = ... }}`",
                local
            )),

            NamespaceError::MissingNamespace { .. } => diag.with_suggestion(suggestions::SHOW_PLAN),
        }
    }
}
