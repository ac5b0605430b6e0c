//! Manifest fixtures for common test scenarios.

use semver::Version;

use crate::core::{DepKind, Dependency, Manifest, ManifestStore};
use crate::resolver::VersionConstraint;

/// A manifest at version 1.0.0.
pub fn pkg(name: &str) -> Manifest {
    Manifest::new(name, Version::new(1, 0, 0))
}

/// `base` exports `dim` and `length`; `util` depends on `base`, imports
/// `dim` from it and exports `nrow`, which calls `dim`; `other` exports a
/// `dim` of its own.
pub fn capture_scenario() -> ManifestStore {
    [
        pkg("base").exports_all(["dim", "length"]),
        pkg("util")
            .depends_on("base", DepKind::AttachRequired)
            .import_from("base", ["dim"])
            .export("nrow")
            .define("nrow", ["dim"]),
        pkg("other").export("dim"),
    ]
    .into_iter()
    .collect()
}

/// `X` needs `lib >= 2.0`, `Y` needs `lib >= 1.0, < 2.0`.
pub fn version_conflict_scenario() -> ManifestStore {
    [
        Manifest::new("lib", Version::new(2, 1, 0)).export("f"),
        pkg("X").with_dependency(
            Dependency::new("lib", DepKind::Required)
                .with_constraint(VersionConstraint::at_least(Version::new(2, 0, 0))),
        ),
        pkg("Y").with_dependency(
            Dependency::new("lib", DepKind::Required).with_constraint(VersionConstraint::between(
                Version::new(1, 0, 0),
                Version::new(2, 0, 0),
            )),
        ),
    ]
    .into_iter()
    .collect()
}

/// The capture scenario as a workspace file.
pub const CAPTURE_WORKSPACE: &str = r#"
[packages.base]
version = "1.0.0"
exports = ["dim", "length"]

[packages.util]
version = "1.0.0"
dependencies = { base = { kind = "depends", version = ">= 1.0" } }
imports = [{ from = "base", symbols = ["dim"] }]
exports = ["nrow"]
definitions = { nrow = ["dim"] }

[packages.other]
version = "1.0.0"
exports = ["dim"]
"#;
