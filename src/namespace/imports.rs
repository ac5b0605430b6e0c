//! Import tables.
//!
//! An import table is a snapshot: each binding holds the definition the
//! source package exported when the table was built, so later changes to
//! the source never leak into an already-built table.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Definition, ImportDirective, Manifest};
use crate::namespace::errors::NamespaceError;
use crate::namespace::exports::ExportTable;
use crate::util::Name;

/// One locally usable name and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: Name,
    pub from: Name,
    pub symbol: Name,
    pub definition: Arc<Definition>,
    /// Bound by an explicit `@importFrom` rather than a whole-package import.
    pub explicit: bool,
}

impl ImportBinding {
    fn describe(&self) -> String {
        format!("{}::{}", self.from, self.symbol)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    entries: BTreeMap<Name, ImportBinding>,
}

impl ImportTable {
    /// Resolve the manifest's import directives against already-built
    /// export tables.
    ///
    /// `exports_of` must return the export table of every package this
    /// one may import from; the load order guarantees those are built.
    pub fn build<F>(manifest: &Manifest, exports_of: F) -> Result<Self, NamespaceError>
    where
        F: Fn(Name) -> Option<Arc<ExportTable>>,
    {
        let package = manifest.name();

        // Undeclared sources are reported before anything is resolved, so a
        // missing dependency edge is never masked by a missing symbol.
        for directive in manifest.imports() {
            let from = directive.source();
            if !manifest.may_import_from(&from) {
                let symbol = match directive {
                    ImportDirective::Symbols { symbols, .. } => symbols.first().map(|s| s.symbol),
                    ImportDirective::Whole { .. } => None,
                };
                return Err(NamespaceError::UndeclaredDependencyImport {
                    package,
                    from,
                    symbol,
                });
            }
        }

        let mut table = ImportTable::default();

        for directive in manifest.imports() {
            let from = directive.source();
            let exports = exports_of(from).ok_or(NamespaceError::MissingNamespace {
                package,
                missing: from,
            })?;

            match directive {
                ImportDirective::Symbols { symbols, .. } => {
                    for import in symbols {
                        let definition = exports.get(&import.symbol).cloned().ok_or(
                            NamespaceError::UnresolvedImport {
                                package,
                                from,
                                symbol: import.symbol,
                            },
                        )?;
                        table.bind(
                            package,
                            ImportBinding {
                                local: import.local,
                                from,
                                symbol: import.symbol,
                                definition,
                                explicit: true,
                            },
                        )?;
                    }
                }
                ImportDirective::Whole { .. } => {
                    for (symbol, definition) in exports.iter() {
                        table.bind(
                            package,
                            ImportBinding {
                                local: symbol,
                                from,
                                symbol,
                                definition: Arc::clone(definition),
                                explicit: false,
                            },
                        )?;
                    }
                }
            }
        }

        Ok(table)
    }

    /// Insert a binding. Explicit bindings beat whole-package bindings; a
    /// later whole-package binding replaces an earlier one; two different
    /// explicit bindings of one name are an error.
    fn bind(&mut self, package: Name, binding: ImportBinding) -> Result<(), NamespaceError> {
        match self.entries.entry(binding.local) {
            Entry::Vacant(slot) => {
                slot.insert(binding);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get();
                let same_target = existing.from == binding.from && existing.symbol == binding.symbol;

                match (existing.explicit, binding.explicit) {
                    _ if same_target => {
                        if binding.explicit {
                            slot.insert(binding);
                        }
                    }
                    (true, true) => {
                        return Err(NamespaceError::ConflictingImport {
                            package,
                            local: binding.local,
                            first: existing.describe(),
                            second: binding.describe(),
                        });
                    }
                    (true, false) => {}
                    (false, true) => {
                        slot.insert(binding);
                    }
                    (false, false) => {
                        tracing::warn!(
                            "{}: import of `{}` replaces `{}`",
                            package,
                            binding.describe(),
                            existing.describe()
                        );
                        slot.insert(binding);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, local: &str) -> Option<&ImportBinding> {
        self.entries.get(local)
    }

    pub fn contains(&self, local: &str) -> bool {
        self.entries.contains_key(local)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportBinding> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
