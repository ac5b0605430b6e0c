//! Per-package namespaces and the registry that owns them.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use semver::Version;

use crate::core::{Definition, Manifest, ManifestStore};
use crate::namespace::errors::NamespaceError;
use crate::namespace::exports::ExportTable;
use crate::namespace::imports::ImportTable;
use crate::resolver::LoadPlan;
use crate::util::Name;

/// Everything a package's own code can see, apart from the built-ins.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: Name,
    version: Version,
    exports: Arc<ExportTable>,
    imports: ImportTable,
    private: BTreeMap<Name, Arc<Definition>>,
    attach_required: Vec<Name>,
}

impl Namespace {
    pub fn name(&self) -> Name {
        self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn exports(&self) -> &Arc<ExportTable> {
        &self.exports
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// Packages that must be attached whenever this one is.
    pub fn attach_required(&self) -> &[Name] {
        &self.attach_required
    }

    /// Defined in this package but not exported.
    pub fn is_private(&self, symbol: &str) -> bool {
        self.private.contains_key(symbol)
    }

    pub fn private_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.private.keys().copied()
    }

    /// Lookup from inside the package: imports, then exports, then private
    /// definitions. Never consults the search path.
    pub fn lookup_internal(&self, symbol: &str) -> Option<&Arc<Definition>> {
        if let Some(binding) = self.imports.get(symbol) {
            return Some(&binding.definition);
        }
        self.exports
            .get(symbol)
            .or_else(|| self.private.get(symbol))
    }
}

/// Build one package's namespace against the namespaces already in
/// `registry`. Exports are checked before imports.
pub fn build_namespace(
    manifest: &Manifest,
    registry: &NamespaceRegistry,
) -> Result<Namespace, NamespaceError> {
    let name = manifest.name();
    let exports = Arc::new(ExportTable::build(manifest)?);
    let imports = ImportTable::build(manifest, |from| {
        registry.get(&from).map(|ns| Arc::clone(&ns.exports))
    })?;

    for binding in imports.iter() {
        if exports.contains(&binding.local) {
            tracing::warn!(
                "{}: imported `{}::{}` shadows its own export `{}`",
                name,
                binding.from,
                binding.symbol,
                binding.local
            );
        }
    }

    let private = manifest
        .private_definitions()
        .map(|symbol| {
            let def = Definition::new(name, symbol, manifest.calls_of(&symbol).to_vec(), false);
            (symbol, Arc::new(def))
        })
        .collect();

    tracing::debug!(
        "built namespace for {} ({} exports, {} imports)",
        name,
        exports.len(),
        imports.len()
    );

    Ok(Namespace {
        name,
        version: manifest.version().clone(),
        exports,
        imports,
        private,
        attach_required: manifest.attach_required(),
    })
}

/// Built namespaces, keyed by package name.
///
/// Namespaces are immutable once inserted; extending the registry produces
/// a new registry that shares the existing entries.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    namespaces: BTreeMap<Name, Arc<Namespace>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every namespace in the plan, one package at a time.
    pub fn build(plan: &LoadPlan, store: &ManifestStore) -> Result<Self, NamespaceError> {
        Self::new().build_missing(plan, store, false)
    }

    /// Build every namespace in the plan, each level of the plan in
    /// parallel.
    pub fn build_parallel(plan: &LoadPlan, store: &ManifestStore) -> Result<Self, NamespaceError> {
        Self::new().build_missing(plan, store, true)
    }

    /// Return a registry extended with every planned package not built yet.
    ///
    /// On error `self` is unchanged and nothing is returned; a registry is
    /// never left half-extended.
    pub fn build_missing(
        &self,
        plan: &LoadPlan,
        store: &ManifestStore,
        parallel: bool,
    ) -> Result<Self, NamespaceError> {
        let mut next = self.clone();

        if parallel {
            for level in plan.levels() {
                let pending: Vec<&Manifest> = level
                    .iter()
                    .filter(|name| !next.contains(name))
                    .filter_map(|name| store.get(name))
                    .collect();

                // Collected in level order, so the first error is
                // deterministic regardless of scheduling.
                let built: Vec<Result<Namespace, NamespaceError>> = pending
                    .par_iter()
                    .map(|manifest| build_namespace(manifest, &next))
                    .collect();

                for namespace in built {
                    next.insert(namespace?);
                }
            }
        } else {
            for name in plan.packages() {
                if next.contains(name) {
                    continue;
                }
                if let Some(manifest) = store.get(name) {
                    let namespace = build_namespace(manifest, &next)?;
                    next.insert(namespace);
                }
            }
        }

        tracing::info!(
            "built {} namespace(s)",
            next.len() - self.len()
        );
        Ok(next)
    }

    fn insert(&mut self, namespace: Namespace) {
        self.namespaces.insert(namespace.name, Arc::new(namespace));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Namespace>> {
        self.namespaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.namespaces.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DepKind;
    use crate::resolver;
    use crate::test_support::capture_scenario;

    fn registry_for(store: &ManifestStore, parallel: bool) -> Result<NamespaceRegistry, NamespaceError> {
        let plan = resolver::build(store).unwrap();
        if parallel {
            NamespaceRegistry::build_parallel(&plan, store)
        } else {
            NamespaceRegistry::build(&plan, store)
        }
    }

    #[test]
    fn test_capture_scenario_tables() {
        let store = capture_scenario();
        let registry = registry_for(&store, false).unwrap();
        assert_eq!(registry.len(), 3);

        let util = registry.get("util").unwrap();
        assert_eq!(util.lookup_internal("dim").unwrap().to_string(), "base::dim");
        assert_eq!(util.lookup_internal("nrow").unwrap().to_string(), "util::nrow");
        assert!(util.lookup_internal("length").is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let store = capture_scenario();
        let sequential = registry_for(&store, false).unwrap();
        let parallel = registry_for(&store, true).unwrap();

        let a: Vec<_> = sequential.names().collect();
        let b: Vec<_> = parallel.names().collect();
        assert_eq!(a, b);
        for name in a {
            assert_eq!(
                sequential.get(&name).unwrap().exports(),
                parallel.get(&name).unwrap().exports()
            );
        }
    }

    #[test]
    fn test_private_definitions_resolve_last() {
        let store: ManifestStore = [Manifest::new("p", Version::new(1, 0, 0))
            .export("f")
            .define("f", ["helper"])
            .define("helper", Vec::<&str>::new())]
        .into_iter()
        .collect();

        let registry = registry_for(&store, false).unwrap();
        let p = registry.get("p").unwrap();
        assert!(p.is_private("helper"));
        assert!(!p.exports().contains("helper"));
        let helper = p.lookup_internal("helper").unwrap();
        assert!(!helper.exported);
    }

    #[test]
    fn test_import_shadows_own_export() {
        let store: ManifestStore = [
            Manifest::new("base", Version::new(1, 0, 0)).export("dim"),
            Manifest::new("p", Version::new(1, 0, 0))
                .depends_on("base", DepKind::Required)
                .import_from("base", ["dim"])
                .export("dim"),
        ]
        .into_iter()
        .collect();

        let registry = registry_for(&store, false).unwrap();
        let p = registry.get("p").unwrap();
        assert_eq!(p.lookup_internal("dim").unwrap().to_string(), "base::dim");
        assert_eq!(p.exports().get("dim").unwrap().to_string(), "p::dim");
    }

    #[test]
    fn test_failure_returns_no_registry() {
        let store: ManifestStore = [
            Manifest::new("a", Version::new(1, 0, 0)).export("f"),
            Manifest::new("b", Version::new(1, 0, 0)).export("g").export("g"),
        ]
        .into_iter()
        .collect();

        for parallel in [false, true] {
            let err = registry_for(&store, parallel).unwrap_err();
            assert_eq!(err.package(), "b");
        }
    }

    #[test]
    fn test_build_missing_keeps_existing_snapshots() {
        let first: ManifestStore = [Manifest::new("base", Version::new(1, 0, 0)).export("dim")]
            .into_iter()
            .collect();
        let registry = registry_for(&first, false).unwrap();
        let base_before = Arc::clone(registry.get("base").unwrap());

        let mut second = first.clone();
        second.insert(
            Manifest::new("util", Version::new(1, 0, 0))
                .depends_on("base", DepKind::Required)
                .import_all("base"),
        );
        let plan = resolver::build(&second).unwrap();
        let extended = registry.build_missing(&plan, &second, false).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(Arc::ptr_eq(&base_before, extended.get("base").unwrap()));
        assert!(extended.get("util").unwrap().imports().contains("dim"));
    }

    #[test]
    fn test_attach_required_recorded() {
        let store: ManifestStore = [
            Manifest::new("a", Version::new(1, 0, 0)),
            Manifest::new("b", Version::new(1, 0, 0)).depends_on("a", DepKind::AttachRequired),
        ]
        .into_iter()
        .collect();

        let registry = registry_for(&store, true).unwrap();
        assert_eq!(registry.get("b").unwrap().attach_required(), &[Name::new("a")]);
        assert!(registry.get("a").unwrap().attach_required().is_empty());
    }
}
