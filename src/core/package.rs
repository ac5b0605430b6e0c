//! Package lifecycle.
//!
//! A package moves Unregistered -> Manifested -> Loaded -> Attached.
//! Attached implies Loaded implies Manifested. Detaching returns a package
//! to Loaded, never below.

use std::fmt;

use semver::Version;
use serde::Serialize;
use thiserror::Error;

use crate::util::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    Unregistered,
    /// Manifest registered, not yet validated.
    Manifested,
    /// Dependencies validated and namespace tables built.
    Loaded,
    /// Loaded and on the search path.
    Attached,
}

/// A state change the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("package cannot go from {from} to {to}")]
pub struct InvalidTransition {
    pub from: PackageState,
    pub to: PackageState,
}

impl PackageState {
    /// Validate a transition, returning the new state.
    pub fn transition(self, to: PackageState) -> Result<PackageState, InvalidTransition> {
        use PackageState::*;

        let allowed = matches!(
            (self, to),
            (Unregistered, Manifested)
                | (Manifested, Manifested)
                | (Manifested, Loaded)
                | (Loaded, Attached)
                | (Attached, Attached)
                | (Attached, Loaded)
        );

        if allowed {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PackageState::Loaded | PackageState::Attached)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageState::Unregistered => "unregistered",
            PackageState::Manifested => "manifested",
            PackageState::Loaded => "loaded",
            PackageState::Attached => "attached",
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package's identity and current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: Name,
    pub version: Version,
    pub state: PackageState,
}

impl PackageInfo {
    /// Display string like "util v0.3.0"
    pub fn display_name(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

impl fmt::Display for PackageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PackageState::*;

    #[test]
    fn test_forward_path() {
        let state = Unregistered.transition(Manifested).unwrap();
        let state = state.transition(Loaded).unwrap();
        let state = state.transition(Attached).unwrap();
        assert_eq!(state, Attached);
        assert!(state.is_loaded());
    }

    #[test]
    fn test_detach_returns_to_loaded() {
        assert_eq!(Attached.transition(Loaded), Ok(Loaded));
        assert!(Attached.transition(Manifested).is_err());
        assert!(Loaded.transition(Manifested).is_err());
    }

    #[test]
    fn test_no_skipping() {
        assert!(Unregistered.transition(Loaded).is_err());
        assert!(Manifested.transition(Attached).is_err());

        let err = Unregistered.transition(Attached).unwrap_err();
        assert_eq!(err.to_string(), "package cannot go from unregistered to attached");
    }

    #[test]
    fn test_reattach_allowed() {
        assert_eq!(Attached.transition(Attached), Ok(Attached));
    }

    #[test]
    fn test_display_name() {
        let info = PackageInfo {
            name: Name::new("util"),
            version: Version::new(0, 3, 0),
            state: Loaded,
        };
        assert_eq!(info.to_string(), "util v0.3.0 (loaded)");
    }
}
