//! The engine: registered manifests, built namespaces and the search path.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use crate::core::{Builtins, Definition, Manifest, ManifestStore, PackageInfo, PackageState};
use crate::namespace::NamespaceRegistry;
use crate::resolver::{self, LoadPlan};
use crate::runtime::errors::{ResolutionError, RuntimeError};
use crate::runtime::resolve::{Context, Resolver};
use crate::runtime::search_path::{AttachedPackage, SearchPath};
use crate::util::{Config, Name};
use crate::Error;

/// One resolved call and the calls its body makes in turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallTrace {
    pub symbol: Name,
    /// `None` when the symbol does not resolve in the caller's namespace.
    pub definition: Option<Arc<Definition>>,
    /// The definition was already expanded earlier in the trace.
    pub repeated: bool,
    pub calls: Vec<CallTrace>,
}

impl CallTrace {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let prefix = if depth == 0 {
            String::new()
        } else {
            format!("{}├── ", "│   ".repeat(depth - 1))
        };
        let target = match &self.definition {
            Some(def) => def.to_string(),
            None => "<unresolved>".to_string(),
        };
        let marker = if self.repeated { " (*)" } else { "" };
        let _ = writeln!(out, "{}{} -> {}{}", prefix, self.symbol, target, marker);

        for call in &self.calls {
            call.render_into(out, depth + 1);
        }
    }
}

pub struct Engine {
    store: ManifestStore,
    loaded: BTreeSet<Name>,
    registry: NamespaceRegistry,
    plan: Option<LoadPlan>,
    search_path: SearchPath,
    builtins: Builtins,
    parallel: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(&Config::default())
    }
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Engine {
            store: ManifestStore::new(),
            loaded: BTreeSet::new(),
            registry: NamespaceRegistry::new(),
            plan: None,
            search_path: SearchPath::new(),
            builtins: Builtins::new(&config.engine.builtins),
            parallel: config.engine.parallel_build,
        }
    }

    /// An engine with every manifest in `store` registered.
    pub fn with_store(config: &Config, store: ManifestStore) -> Self {
        Engine {
            store,
            ..Engine::new(config)
        }
    }

    /// Register (or replace) a manifest. Loaded packages are immutable.
    pub fn register(&mut self, manifest: Manifest) -> Result<PackageState, RuntimeError> {
        let name = manifest.name();
        let current = self.state(&name);
        if current.is_loaded() {
            return Err(RuntimeError::AlreadyLoaded { package: name });
        }

        let state = current
            .transition(PackageState::Manifested)
            .map_err(|_| RuntimeError::AlreadyLoaded { package: name })?;
        if self.store.insert(manifest).is_some() {
            tracing::debug!("replaced manifest of {}", name);
        }
        Ok(state)
    }

    /// Validate the dependency graph of everything registered and build
    /// the namespaces that do not exist yet.
    ///
    /// All or nothing: on error no package changes state and the previous
    /// plan and namespaces stay in place.
    pub fn load(&mut self) -> Result<&LoadPlan, Error> {
        let plan = resolver::build(&self.store)?;
        let registry = self
            .registry
            .build_missing(&plan, &self.store, self.parallel)?;

        self.loaded.extend(plan.packages().iter().copied());
        self.registry = registry;
        tracing::info!("loaded {} package(s)", plan.len());

        Ok(&*self.plan.insert(plan))
    }

    /// Attach a loaded package, along with whatever it requires attached.
    /// Returns the packages newly placed on the search path.
    pub fn attach(&self, name: &str) -> Result<Vec<Name>, RuntimeError> {
        let pkg = self.registered(name)?;
        let ns = self.resolver().namespace(pkg)?;

        let mut required = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(pkg);
        for &dep in ns.attach_required() {
            self.collect_required(dep, &mut seen, &mut required)?;
        }

        let added = self.search_path.attach(AttachedPackage::from(ns.as_ref()), required);
        tracing::info!("attached {} (search path: {})", pkg, self.search_path.len());
        Ok(added)
    }

    // Post-order, so each package follows what it requires.
    fn collect_required(
        &self,
        name: Name,
        seen: &mut HashSet<Name>,
        out: &mut Vec<AttachedPackage>,
    ) -> Result<(), RuntimeError> {
        if !seen.insert(name) {
            return Ok(());
        }
        let ns = self.resolver().namespace(name)?;
        for &dep in ns.attach_required() {
            self.collect_required(dep, seen, out)?;
        }
        out.push(AttachedPackage::from(ns.as_ref()));
        Ok(())
    }

    pub fn detach(&self, name: &str) -> Result<(), RuntimeError> {
        self.registered(name)?;
        self.search_path.detach(name)?;
        tracing::info!("detached {}", name);
        Ok(())
    }

    pub fn resolve(&self, symbol: &str, context: Context) -> Result<Arc<Definition>, ResolutionError> {
        self.resolver().resolve(symbol, context)
    }

    /// Resolve `symbol`, then every symbol its body calls, each in the
    /// namespace of the package defining the caller.
    pub fn trace(&self, symbol: &str, context: Context) -> Result<CallTrace, ResolutionError> {
        let resolver = self.resolver();
        let root = resolver.resolve(symbol, context)?;
        let mut expanded = HashSet::new();
        Ok(self.trace_definition(&resolver, Name::new(symbol), Some(root), &mut expanded))
    }

    fn trace_definition(
        &self,
        resolver: &Resolver<'_>,
        symbol: Name,
        definition: Option<Arc<Definition>>,
        expanded: &mut HashSet<String>,
    ) -> CallTrace {
        let mut trace = CallTrace {
            symbol,
            definition: definition.clone(),
            repeated: false,
            calls: Vec::new(),
        };

        let Some(def) = definition else {
            return trace;
        };
        let Some(pkg) = def.package() else {
            return trace;
        };
        if !expanded.insert(def.to_string()) {
            trace.repeated = !def.calls.is_empty();
            return trace;
        }

        for &call in &def.calls {
            let callee = resolver.resolve(&call, Context::Internal(pkg)).ok();
            trace
                .calls
                .push(self.trace_definition(resolver, call, callee, expanded));
        }
        trace
    }

    /// Current lifecycle state of a package.
    pub fn state(&self, name: &str) -> PackageState {
        if self.search_path.contains(name) {
            PackageState::Attached
        } else if self.loaded.contains(name) {
            PackageState::Loaded
        } else if self.store.contains(name) {
            PackageState::Manifested
        } else {
            PackageState::Unregistered
        }
    }

    pub fn info(&self, name: &str) -> Option<PackageInfo> {
        self.store.get(name).map(|manifest| PackageInfo {
            name: manifest.name(),
            version: manifest.version().clone(),
            state: self.state(name),
        })
    }

    /// Every registered package with its state.
    pub fn states(&self) -> BTreeMap<Name, PackageState> {
        self.store.names().map(|n| (n, self.state(&n))).collect()
    }

    pub fn plan(&self) -> Option<&LoadPlan> {
        self.plan.as_ref()
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    pub fn search_path(&self) -> Vec<Name> {
        self.search_path.packages()
    }

    /// Detach everything. Loaded namespaces are kept.
    pub fn shutdown(&self) {
        self.search_path.clear();
        tracing::debug!("search path cleared");
    }

    // Unknown names are reported without being interned.
    fn registered(&self, name: &str) -> Result<Name, RuntimeError> {
        self.store
            .get(name)
            .map(|manifest| manifest.name())
            .ok_or_else(|| RuntimeError::UnknownPackage {
                package: name.to_string(),
            })
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store, &self.registry, &self.search_path, &self.builtins)
    }
}
