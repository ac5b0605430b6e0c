//! Export tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Definition, Manifest};
use crate::namespace::errors::NamespaceError;
use crate::util::Name;

/// A package's exported symbols. Built once, immutable afterwards, and
/// shared by reference between the registry, dependents' import tables and
/// the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    package: Name,
    entries: BTreeMap<Name, Arc<Definition>>,
}

impl ExportTable {
    /// Build from the manifest's export directives. A name exported twice
    /// fails the build even when both directives are identical.
    pub fn build(manifest: &Manifest) -> Result<Self, NamespaceError> {
        let package = manifest.name();
        let mut entries = BTreeMap::new();

        for &symbol in manifest.exports() {
            let definition = Definition::new(
                package,
                symbol,
                manifest.calls_of(&symbol).to_vec(),
                true,
            );
            if entries.insert(symbol, Arc::new(definition)).is_some() {
                return Err(NamespaceError::DuplicateExport { package, symbol });
            }
        }

        Ok(ExportTable { package, entries })
    }

    pub fn package(&self) -> Name {
        self.package
    }

    pub fn get(&self, symbol: &str) -> Option<&Arc<Definition>> {
        self.entries.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Exported names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &Arc<Definition>)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
