//! Dependency declarations.
//!
//! A Dependency describes one edge from a package to another: which
//! package, how strongly it is needed, and which versions are acceptable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::version::VersionConstraint;
use crate::util::Name;

/// The relation a dependency edge expresses.
///
/// Manifests may also spell these the way R's DESCRIPTION fields do:
/// `imports`, `suggests`, `linking-to` and `depends`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepKind {
    /// Needed at runtime; symbols may be imported from it.
    #[serde(alias = "imports")]
    Required,

    /// Needed only while developing the package (tests, examples).
    #[serde(alias = "dev")]
    RequiredDev,

    /// Used when available.
    #[serde(alias = "suggests")]
    Optional,

    /// Needed at link time for native code.
    #[serde(alias = "linking-to")]
    LinkTime,

    /// Needed at runtime and attached alongside the dependent.
    #[serde(alias = "depends")]
    AttachRequired,
}

impl DepKind {
    pub const ALL: [DepKind; 5] = [
        DepKind::Required,
        DepKind::RequiredDev,
        DepKind::Optional,
        DepKind::LinkTime,
        DepKind::AttachRequired,
    ];

    /// Whether the edge constrains load order.
    pub fn affects_load_order(&self) -> bool {
        matches!(
            self,
            DepKind::Required | DepKind::AttachRequired | DepKind::LinkTime
        )
    }

    /// Whether the dependent may import symbols through this edge.
    pub fn permits_imports(&self) -> bool {
        matches!(self, DepKind::Required | DepKind::AttachRequired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepKind::Required => "required",
            DepKind::RequiredDev => "required-dev",
            DepKind::Optional => "optional",
            DepKind::LinkTime => "link-time",
            DepKind::AttachRequired => "attach-required",
        }
    }

    /// The DESCRIPTION field this kind corresponds to.
    pub fn field_name(&self) -> &'static str {
        match self {
            DepKind::Required => "Imports",
            DepKind::RequiredDev | DepKind::Optional => "Suggests",
            DepKind::LinkTime => "LinkingTo",
            DepKind::AttachRequired => "Depends",
        }
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    name: Name,
    kind: DepKind,
    constraint: VersionConstraint,
}

impl Dependency {
    /// A dependency accepting any version.
    pub fn new(name: impl Into<Name>, kind: DepKind) -> Self {
        Dependency {
            name: name.into(),
            kind,
            constraint: VersionConstraint::any(),
        }
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn kind(&self) -> DepKind {
        self.kind
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    pub fn matches_version(&self, version: &semver::Version) -> bool {
        self.constraint.satisfied_by(version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_any() {
            write!(f, "{} ({})", self.name, self.kind)
        } else {
            write!(f, "{} {} ({})", self.name, self.constraint, self.kind)
        }
    }
}
