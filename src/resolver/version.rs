//! Version constraints.
//!
//! A constraint is a set of acceptable versions stored as a PubGrub
//! `Range`, so intersection and satisfaction are plain set operations.
//! Only lower bounds, upper bounds and ranges between them are accepted;
//! exact pins are rejected at parse time.

use std::fmt;
use std::str::FromStr;

use pubgrub::Range;
use semver::{Comparator, Op, Version, VersionReq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error parsing a version constraint.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("invalid version constraint `{text}`: {source}")]
    Invalid {
        text: String,
        #[source]
        source: semver::Error,
    },

    #[error("exact version pins are not supported: `{text}` (use `>= {version}` instead)")]
    ExactPin { text: String, version: String },

    #[error("version constraint `{text}` needs a comparison operator such as `>=`")]
    MissingOperator { text: String },
}

/// A set of acceptable versions for a dependency.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    range: Range<Version>,
    text: String,
}

impl VersionConstraint {
    /// Any version is acceptable.
    pub fn any() -> Self {
        VersionConstraint {
            range: Range::full(),
            text: "*".to_string(),
        }
    }

    /// `>= version`
    pub fn at_least(version: Version) -> Self {
        VersionConstraint {
            text: format!(">={}", version),
            range: Range::higher_than(version),
        }
    }

    /// `> version`
    pub fn greater_than(version: Version) -> Self {
        VersionConstraint {
            text: format!(">{}", version),
            range: Range::strictly_higher_than(version),
        }
    }

    /// `< version`
    pub fn below(version: Version) -> Self {
        VersionConstraint {
            text: format!("<{}", version),
            range: Range::strictly_lower_than(version),
        }
    }

    /// `>= low, < high`
    pub fn between(low: Version, high: Version) -> Self {
        VersionConstraint {
            text: format!(">={}, <{}", low, high),
            range: Range::between(low, high),
        }
    }

    /// Parse a comparator list such as `>= 1.0, < 2.0`.
    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self::any());
        }

        for part in trimmed.split(',') {
            let part = part.trim();
            if !part.starts_with(['>', '<', '^', '~', '=']) {
                return Err(ConstraintError::MissingOperator {
                    text: trimmed.to_string(),
                });
            }
        }

        let req: VersionReq = trimmed.parse().map_err(|source| ConstraintError::Invalid {
            text: trimmed.to_string(),
            source,
        })?;

        let mut range = Range::full();
        for comp in &req.comparators {
            if comp.op == Op::Exact {
                return Err(ConstraintError::ExactPin {
                    text: trimmed.to_string(),
                    version: comparator_version(comp).to_string(),
                });
            }
            range = range.intersection(&comparator_to_range(comp));
        }

        Ok(VersionConstraint {
            range,
            text: trimmed.to_string(),
        })
    }

    /// The constraint both `self` and `other` impose.
    pub fn intersect(&self, other: &VersionConstraint) -> VersionConstraint {
        let text = match (self.is_any(), other.is_any()) {
            (true, _) => other.text.clone(),
            (_, true) => self.text.clone(),
            _ => format!("{}, {}", self.text, other.text),
        };

        VersionConstraint {
            range: self.range.intersection(&other.range),
            text,
        }
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.range.contains(version)
    }

    /// True when no version at all can satisfy the constraint.
    pub fn is_unsatisfiable(&self) -> bool {
        self.range == Range::empty()
    }

    pub fn is_any(&self) -> bool {
        self.range == Range::full()
    }

    pub fn range(&self) -> &Range<Version> {
        &self.range
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
    }
}

impl Eq for VersionConstraint {}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

fn comparator_version(comp: &Comparator) -> Version {
    let mut version = Version::new(comp.major, comp.minor.unwrap_or(0), comp.patch.unwrap_or(0));
    version.pre = comp.pre.clone();
    version
}

/// The first version past major `major`, or `None` when it overflows.
fn next_major(major: u64) -> Option<Version> {
    major.checked_add(1).map(|m| Version::new(m, 0, 0))
}

/// Carries into the major component when the minor one overflows.
fn next_minor(major: u64, minor: u64) -> Option<Version> {
    match minor.checked_add(1) {
        Some(n) => Some(Version::new(major, n, 0)),
        None => next_major(major),
    }
}

fn next_patch(major: u64, minor: u64, patch: u64) -> Option<Version> {
    match patch.checked_add(1) {
        Some(p) => Some(Version::new(major, minor, p)),
        None => next_minor(major, minor),
    }
}

/// `>= low, < upper`; unbounded above when there is no next version.
fn up_to(low: Version, upper: Option<Version>) -> Range<Version> {
    match upper {
        Some(upper) => Range::between(low, upper),
        None => Range::higher_than(low),
    }
}

/// Convert a single comparator to a range.
fn comparator_to_range(comp: &Comparator) -> Range<Version> {
    let major = comp.major;
    let minor = comp.minor.unwrap_or(0);
    let patch = comp.patch.unwrap_or(0);
    let version = comparator_version(comp);

    // Next version after a partial comparator such as `1` or `1.2`.
    let next_partial = || match comp.minor {
        None => next_major(major),
        Some(_) => next_minor(major, minor),
    };

    match comp.op {
        // `> 1` means `>= 2.0.0`, `> 1.2` means `>= 1.3.0`
        Op::Greater if comp.patch.is_none() => match next_partial() {
            Some(next) => Range::higher_than(next),
            None => Range::empty(),
        },
        Op::Greater => Range::strictly_higher_than(version),

        Op::GreaterEq => Range::higher_than(version),

        Op::Less => Range::strictly_lower_than(version),

        Op::LessEq if comp.patch.is_none() => match next_partial() {
            Some(next) => Range::strictly_lower_than(next),
            None => Range::full(),
        },
        Op::LessEq => Range::lower_than(version),

        // ~1.2.3 := >=1.2.3, <1.3.0
        Op::Tilde | Op::Wildcard => up_to(version, next_partial()),

        // ^1.2.3 := >=1.2.3, <2.0.0 and ^0.2.3 := >=0.2.3, <0.3.0
        Op::Caret => {
            let upper = if major > 0 || comp.minor.is_none() {
                next_major(major)
            } else if minor > 0 || comp.patch.is_none() {
                next_minor(0, minor)
            } else {
                next_patch(0, 0, patch)
            };
            up_to(version, upper)
        }

        _ => Range::full(),
    }
}

/// Parse a version string, filling in missing minor/patch components.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [major] => Some(Version::new(major.parse().ok()?, 0, 0)),
        [major, minor] => Some(Version::new(major.parse().ok()?, minor.parse().ok()?, 0)),
        _ => None,
    }
}
