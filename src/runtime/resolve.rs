//! Symbol resolution.
//!
//! Three kinds of reference, three lookups:
//! - `Internal(P)`: code inside P. P's imports, exports and private
//!   definitions, then the built-ins. The search path is never consulted.
//! - `Qualified(P)`: an explicit `P::symbol`. P's exports only.
//! - `TopLevel`: an unqualified reference from outside any package. The
//!   search path only.
//!
//! Only `TopLevel` depends on what is attached.

use std::fmt;
use std::sync::Arc;

use crate::core::{Builtins, Definition, ManifestStore, PackageState};
use crate::namespace::{Namespace, NamespaceRegistry};
use crate::runtime::errors::{ResolutionError, RuntimeError};
use crate::runtime::search_path::SearchPath;
use crate::util::Name;

/// Where a symbol reference is made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Internal(Name),
    Qualified(Name),
    TopLevel,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Internal(pkg) => write!(f, "in package `{}`", pkg),
            Context::Qualified(pkg) => write!(f, "in `{}` exports", pkg),
            Context::TopLevel => f.write_str("at top level"),
        }
    }
}

/// A read-only view over the engine's tables.
pub struct Resolver<'a> {
    store: &'a ManifestStore,
    registry: &'a NamespaceRegistry,
    search_path: &'a SearchPath,
    builtins: &'a Builtins,
}

impl<'a> Resolver<'a> {
    pub fn new(
        store: &'a ManifestStore,
        registry: &'a NamespaceRegistry,
        search_path: &'a SearchPath,
        builtins: &'a Builtins,
    ) -> Self {
        Resolver {
            store,
            registry,
            search_path,
            builtins,
        }
    }

    pub fn resolve(&self, symbol: &str, context: Context) -> Result<Arc<Definition>, ResolutionError> {
        tracing::debug!("resolving `{}` {}", symbol, context);

        match context {
            Context::Internal(pkg) => {
                let ns = self.namespace(pkg)?;
                ns.lookup_internal(symbol)
                    .or_else(|| self.builtins.get(symbol))
                    .cloned()
                    .ok_or_else(|| undefined(symbol, context))
            }
            Context::Qualified(pkg) => {
                let ns = self.namespace(pkg)?;
                ns.exports()
                    .get(symbol)
                    .cloned()
                    .ok_or_else(|| ResolutionError::NotExported {
                        package: pkg,
                        symbol: symbol.to_string(),
                        private: ns.is_private(symbol),
                    })
            }
            Context::TopLevel => self.search_path.lookup(symbol).map_err(|err| match err {
                ResolutionError::NotFound { .. } => undefined(symbol, context),
                other => other,
            }),
        }
    }

    /// The built namespace of a loaded package.
    pub fn namespace(&self, pkg: Name) -> Result<&'a Arc<Namespace>, RuntimeError> {
        if let Some(ns) = self.registry.get(&pkg) {
            return Ok(ns);
        }
        if self.store.contains(&pkg) {
            Err(RuntimeError::NotLoaded {
                package: pkg,
                state: PackageState::Manifested,
            })
        } else {
            Err(RuntimeError::UnknownPackage {
                package: pkg.to_string(),
            })
        }
    }
}

fn undefined(symbol: &str, context: Context) -> ResolutionError {
    ResolutionError::UndefinedSymbol {
        symbol: symbol.to_string(),
        where_: context.to_string(),
    }
}
