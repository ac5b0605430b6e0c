//! LoadPlan - the validated load order.
//!
//! Once built, a LoadPlan is read-only. Every package appears after all of
//! its Required, AttachRequired and LinkTime dependencies.

use std::collections::BTreeMap;

use semver::Version;
use serde::Serialize;

use crate::util::hash::Fingerprint;
use crate::util::Name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadPlan {
    /// Packages in load order
    order: Vec<Name>,

    /// Packages grouped by dependency depth; level 0 has no load-order
    /// dependencies and level N depends only on levels below N.
    levels: Vec<Vec<Name>>,

    /// Load-order dependencies of each package, sorted and deduplicated
    dependencies: BTreeMap<Name, Vec<Name>>,

    versions: BTreeMap<Name, Version>,
}

impl LoadPlan {
    /// Assemble a plan from an order that is already topologically valid.
    pub(crate) fn new(
        order: Vec<Name>,
        dependencies: BTreeMap<Name, Vec<Name>>,
        versions: BTreeMap<Name, Version>,
    ) -> Self {
        let mut depth: BTreeMap<Name, usize> = BTreeMap::new();
        let mut levels: Vec<Vec<Name>> = Vec::new();

        for &name in &order {
            let level = dependencies
                .get(&name)
                .into_iter()
                .flatten()
                .filter_map(|dep| depth.get(dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);

            depth.insert(name, level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(name);
        }

        for level in &mut levels {
            level.sort();
        }

        LoadPlan {
            order,
            levels,
            dependencies,
            versions,
        }
    }

    /// Packages in load order.
    pub fn packages(&self) -> &[Name] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.versions.contains_key(name)
    }

    /// Position of a package in the load order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| *n == name)
    }

    /// Packages loaded before `name`.
    pub fn prefix(&self, name: &str) -> &[Name] {
        match self.position(name) {
            Some(pos) => &self.order[..pos],
            None => &[],
        }
    }

    /// Load-order dependencies of a package.
    pub fn dependencies_of(&self, name: &str) -> &[Name] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn levels(&self) -> &[Vec<Name>] {
        &self.levels
    }

    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.versions.get(name)
    }

    /// Stable identifier for this plan: names, versions and load edges.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for name in &self.order {
            fp.update_str(name);
            if let Some(version) = self.versions.get(name) {
                fp.update_str(&version.to_string());
            }
            fp.update_strs(self.dependencies_of(name).iter().map(|d| d.as_str()));
            fp.end_group();
        }
        fp.finish()
    }
}
