//! Package manifests.
//!
//! A Manifest is the structured declaration of one package: its version,
//! its dependency edges, the symbols it exports, and the symbols it
//! imports from other packages. The engine never parses files itself;
//! `TomlManifest` is the schema the workspace file uses and converts into
//! a `Manifest`.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::core::dependency::{DepKind, Dependency};
use crate::resolver::version::{parse_version_lenient, VersionConstraint};
use crate::util::Name;

/// One symbol bound by an `@importFrom`-style directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolImport {
    /// Name usable inside the importing package
    pub local: Name,
    /// Name in the source package's export table
    pub symbol: Name,
}

impl SymbolImport {
    pub fn same(symbol: impl Into<Name>) -> Self {
        let symbol = symbol.into();
        SymbolImport {
            local: symbol,
            symbol,
        }
    }

    pub fn renamed(local: impl Into<Name>, symbol: impl Into<Name>) -> Self {
        SymbolImport {
            local: local.into(),
            symbol: symbol.into(),
        }
    }
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDirective {
    /// Import selected symbols (`@importFrom pkg a b`).
    Symbols { from: Name, symbols: Vec<SymbolImport> },

    /// Import every export of a package (`@import pkg`).
    Whole { from: Name },
}

impl ImportDirective {
    pub fn source(&self) -> Name {
        match self {
            ImportDirective::Symbols { from, .. } | ImportDirective::Whole { from } => *from,
        }
    }
}

/// The declaration of one package.
#[derive(Debug, Clone)]
pub struct Manifest {
    name: Name,
    version: Version,
    dependencies: Vec<Dependency>,
    /// Export directives in declaration order; duplicates are kept so the
    /// namespace build can reject them.
    exports: Vec<Name>,
    imports: Vec<ImportDirective>,
    /// Body model: symbol -> free symbols its body references.
    definitions: BTreeMap<Name, Vec<Name>>,
}

impl Manifest {
    pub fn new(name: impl Into<Name>, version: Version) -> Self {
        Manifest {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            exports: Vec::new(),
            imports: Vec::new(),
            definitions: BTreeMap::new(),
        }
    }

    pub fn with_dependency(mut self, dep: Dependency) -> Self {
        self.dependencies.push(dep);
        self
    }

    /// Add a dependency accepting any version.
    pub fn depends_on(self, name: impl Into<Name>, kind: DepKind) -> Self {
        self.with_dependency(Dependency::new(name, kind))
    }

    pub fn export(mut self, symbol: impl Into<Name>) -> Self {
        self.exports.push(symbol.into());
        self
    }

    pub fn exports_all<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.exports.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn with_import(mut self, directive: ImportDirective) -> Self {
        self.imports.push(directive);
        self
    }

    /// `@importFrom from symbols...`
    pub fn import_from<I, S>(self, from: impl Into<Name>, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.with_import(ImportDirective::Symbols {
            from: from.into(),
            symbols: symbols.into_iter().map(SymbolImport::same).collect(),
        })
    }

    /// `@import from`
    pub fn import_all(self, from: impl Into<Name>) -> Self {
        self.with_import(ImportDirective::Whole { from: from.into() })
    }

    /// Describe a definition's body by the symbols it calls. Symbols that
    /// are defined but never exported are private to the package.
    pub fn define<I, S>(mut self, symbol: impl Into<Name>, calls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.definitions
            .insert(symbol.into(), calls.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn exports(&self) -> &[Name] {
        &self.exports
    }

    pub fn imports(&self) -> &[ImportDirective] {
        &self.imports
    }

    pub fn definitions(&self) -> &BTreeMap<Name, Vec<Name>> {
        &self.definitions
    }

    /// Symbols the body of `symbol` calls, empty when undescribed.
    pub fn calls_of(&self, symbol: &str) -> &[Name] {
        self.definitions
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Definitions that are not exported.
    pub fn private_definitions(&self) -> impl Iterator<Item = Name> + '_ {
        self.definitions
            .keys()
            .copied()
            .filter(|sym| !self.exports.contains(sym))
    }

    /// Dependency edges pointing at `name`.
    pub fn dependencies_on<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> {
        self.dependencies.iter().filter(move |d| d.name() == name)
    }

    /// Whether symbols may be imported from `name`.
    pub fn may_import_from(&self, name: &str) -> bool {
        self.dependencies_on(name).any(|d| d.kind().permits_imports())
    }

    /// Packages this one requires to be attached alongside it.
    pub fn attach_required(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self
            .dependencies
            .iter()
            .filter(|d| d.kind() == DepKind::AttachRequired)
            .map(|d| d.name())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// `[packages.<name>]` as written in the workspace file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlManifest {
    pub version: String,

    #[serde(default)]
    pub dependencies: BTreeMap<String, TomlDependency>,

    #[serde(default)]
    pub exports: Vec<String>,

    #[serde(default)]
    pub imports: Vec<TomlImport>,

    #[serde(default)]
    pub definitions: BTreeMap<String, Vec<String>>,
}

/// A dependency entry: `base = ">= 1.0"`, `base = { kind = "depends" }` or
/// `rcpp = { kind = ["imports", "linking-to"] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TomlDependency {
    /// Constraint string, kind `imports`.
    Simple(String),
    Detailed(DetailedDependency),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedDependency {
    #[serde(default)]
    pub kind: Option<TomlDepKinds>,

    #[serde(default)]
    pub version: Option<String>,
}

/// One edge kind, or several sharing the same version constraint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TomlDepKinds {
    One(DepKind),
    Many(Vec<DepKind>),
}

/// An import entry: `{ from = "base", symbols = ["dim"] }` or
/// `{ from = "base", all = true }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlImport {
    pub from: String,

    #[serde(default)]
    pub symbols: Vec<TomlImportSymbol>,

    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TomlImportSymbol {
    Same(String),
    Renamed { local: String, symbol: String },
}

impl TomlDependency {
    /// One `Dependency` per declared edge kind.
    fn to_dependencies(&self, name: &str) -> Result<Vec<Dependency>> {
        let (mut kinds, version) = match self {
            TomlDependency::Simple(version) => (vec![DepKind::Required], Some(version.as_str())),
            TomlDependency::Detailed(detail) => {
                let kinds = match &detail.kind {
                    None => vec![DepKind::Required],
                    Some(TomlDepKinds::One(kind)) => vec![*kind],
                    Some(TomlDepKinds::Many(kinds)) => kinds.clone(),
                };
                (kinds, detail.version.as_deref())
            }
        };

        if kinds.is_empty() {
            bail!("dependency `{}` lists no kinds", name);
        }
        kinds.sort();
        kinds.dedup();

        let constraint = match version {
            Some(text) => VersionConstraint::parse(text)
                .with_context(|| format!("invalid constraint for dependency `{}`", name))?,
            None => VersionConstraint::any(),
        };

        Ok(kinds
            .into_iter()
            .map(|kind| Dependency::new(name, kind).with_constraint(constraint.clone()))
            .collect())
    }
}

impl TomlImport {
    fn to_directive(&self) -> Result<ImportDirective> {
        let from = Name::new(&self.from);
        match (self.all, self.symbols.is_empty()) {
            (true, true) => Ok(ImportDirective::Whole { from }),
            (true, false) => bail!(
                "import from `{}` cannot combine `all = true` with `symbols`",
                self.from
            ),
            (false, true) => bail!(
                "import from `{}` lists no symbols (use `all = true` to import everything)",
                self.from
            ),
            (false, false) => {
                let symbols = self
                    .symbols
                    .iter()
                    .map(|s| match s {
                        TomlImportSymbol::Same(symbol) => SymbolImport::same(symbol),
                        TomlImportSymbol::Renamed { local, symbol } => {
                            SymbolImport::renamed(local, symbol)
                        }
                    })
                    .collect();
                Ok(ImportDirective::Symbols { from, symbols })
            }
        }
    }
}

impl TomlManifest {
    /// Convert to a Manifest for the package called `name`.
    pub fn into_manifest(self, name: &str) -> Result<Manifest> {
        let version = parse_version_lenient(&self.version)
            .with_context(|| format!("invalid version `{}` for package `{}`", self.version, name))?;

        let mut manifest = Manifest::new(name, version);

        for (dep_name, spec) in &self.dependencies {
            for dep in spec.to_dependencies(dep_name)? {
                manifest = manifest.with_dependency(dep);
            }
        }

        manifest = manifest.exports_all(self.exports.iter());

        for import in &self.imports {
            manifest = manifest.with_import(
                import
                    .to_directive()
                    .with_context(|| format!("invalid import in package `{}`", name))?,
            );
        }

        for (symbol, calls) in &self.definitions {
            manifest = manifest.define(symbol, calls.iter());
        }

        Ok(manifest)
    }
}
