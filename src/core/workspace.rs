//! Workspace file loading.
//!
//! A workspace file (`Mooring.toml`) declares a set of packages, one
//! `[packages.<name>]` table each. It is the CLI's input format; library
//! users can build a `ManifestStore` directly instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::core::manifest::TomlManifest;
use crate::core::store::ManifestStore;

/// Workspace file name.
pub const WORKSPACE_FILE: &str = "Mooring.toml";

#[derive(Debug, Error)]
pub enum WorkspaceFileError {
    #[error("no Mooring.toml found in {} or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

/// Return the workspace file in `dir`, if present.
pub fn find_workspace_file(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(WORKSPACE_FILE);
    path.is_file().then_some(path)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlWorkspace {
    #[serde(default)]
    packages: BTreeMap<String, TomlManifest>,
}

/// A loaded workspace file.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    store: ManifestStore,
}

impl Workspace {
    /// Load and parse a workspace file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let store = Self::parse(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::debug!("loaded {} package(s) from {}", store.len(), path.display());

        Ok(Workspace {
            path: path.to_path_buf(),
            store,
        })
    }

    /// Parse workspace file contents into a manifest store.
    pub fn parse(contents: &str) -> Result<ManifestStore> {
        let raw: TomlWorkspace = toml::from_str(contents)?;

        let mut store = ManifestStore::new();
        for (name, manifest) in raw.packages {
            let manifest = manifest
                .into_manifest(&name)
                .with_context(|| format!("in package `{}`", name))?;
            store.insert(manifest);
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn into_store(self) -> ManifestStore {
        self.store
    }
}
