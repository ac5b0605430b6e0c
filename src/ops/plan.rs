//! `plan` and `check`: validating a manifest store.

use std::fmt::Write;

use semver::Version;
use serde::Serialize;

use crate::core::ManifestStore;
use crate::namespace::NamespaceRegistry;
use crate::resolver::{self, LoadPlan};
use crate::util::{Config, Name};
use crate::Error;

/// One package in load order.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub name: Name,
    pub version: Version,
    pub dependencies: Vec<Name>,
}

/// A load plan in a shape suited for printing or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub fingerprint: String,
    pub order: Vec<PlanEntry>,
    pub levels: Vec<Vec<Name>>,
}

impl From<&LoadPlan> for PlanReport {
    fn from(plan: &LoadPlan) -> Self {
        let order = plan
            .packages()
            .iter()
            .map(|&name| PlanEntry {
                name,
                version: plan.version_of(&name).cloned().unwrap_or_else(|| Version::new(0, 0, 0)),
                dependencies: plan.dependencies_of(&name).to_vec(),
            })
            .collect();

        PlanReport {
            fingerprint: plan.fingerprint(),
            order,
            levels: plan.levels().to_vec(),
        }
    }
}

/// Validate the dependency graph and compute the load order.
pub fn plan(store: &ManifestStore) -> Result<PlanReport, Error> {
    let plan = resolver::build(store)?;
    Ok(PlanReport::from(&plan))
}

pub fn format_plan(report: &PlanReport) -> String {
    let mut output = String::new();

    writeln!(output, "Load order ({} packages):", report.order.len()).unwrap();
    for (i, entry) in report.order.iter().enumerate() {
        write!(output, "  {:>3}. {} v{}", i + 1, entry.name, entry.version).unwrap();
        if !entry.dependencies.is_empty() {
            let deps: Vec<&str> = entry.dependencies.iter().map(|d| d.as_str()).collect();
            write!(output, " (after {})", deps.join(", ")).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output, "\nFingerprint: {}", &report.fingerprint[..16]).unwrap();
    output
}

/// Result of a full validation: plan plus every namespace.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub packages: usize,
    pub levels: usize,
    pub exports: usize,
    pub imports: usize,
    pub fingerprint: String,
}

/// Build the plan and every namespace, reporting the first error.
pub fn check(store: &ManifestStore, config: &Config) -> Result<CheckReport, Error> {
    let plan = resolver::build(store)?;
    let registry = if config.engine.parallel_build {
        NamespaceRegistry::build_parallel(&plan, store)?
    } else {
        NamespaceRegistry::build(&plan, store)?
    };

    let mut exports = 0;
    let mut imports = 0;
    for name in registry.names() {
        if let Some(ns) = registry.get(&name) {
            exports += ns.exports().len();
            imports += ns.imports().len();
        }
    }

    Ok(CheckReport {
        packages: plan.len(),
        levels: plan.levels().len(),
        exports,
        imports,
        fingerprint: plan.fingerprint(),
    })
}

pub fn format_check(report: &CheckReport) -> String {
    format!(
        "ok: {} packages in {} levels, {} exports, {} imports\n",
        report.packages, report.levels, report.exports, report.imports
    )
}
