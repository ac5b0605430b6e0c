//! The manifest store.
//!
//! Holds one manifest per package name. Pure data: validation belongs to
//! the graph builder and the namespace registry.

use std::collections::BTreeMap;

use crate::core::Manifest;
use crate::util::Name;

#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    manifests: BTreeMap<Name, Manifest>,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a manifest, returning the one it replaced.
    pub fn insert(&mut self, manifest: Manifest) -> Option<Manifest> {
        self.manifests.insert(manifest.name(), manifest)
    }

    pub fn get(&self, name: &str) -> Option<&Manifest> {
        self.manifests.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.manifests.contains_key(name)
    }

    /// Package names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.manifests.keys().copied()
    }

    /// Manifests in lexical order of package name.
    pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
        self.manifests.values()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

impl FromIterator<Manifest> for ManifestStore {
    fn from_iter<T: IntoIterator<Item = Manifest>>(iter: T) -> Self {
        let mut store = ManifestStore::new();
        for manifest in iter {
            store.insert(manifest);
        }
        store
    }
}
