//! The search path: attached packages, most recently attached first.
//!
//! This is the engine's only mutable shared state. Every operation holds
//! the one lock for its whole duration, so concurrent attach/detach calls
//! can never observe or produce a torn ordering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::Definition;
use crate::namespace::{ExportTable, Namespace};
use crate::runtime::errors::{ResolutionError, RuntimeError};
use crate::util::Name;

/// One entry on the search path.
#[derive(Debug, Clone)]
pub struct AttachedPackage {
    pub name: Name,
    pub exports: Arc<ExportTable>,
    /// Packages that must stay attached while this one is.
    pub attach_required: Vec<Name>,
}

impl From<&Namespace> for AttachedPackage {
    fn from(ns: &Namespace) -> Self {
        AttachedPackage {
            name: ns.name(),
            exports: Arc::clone(ns.exports()),
            attach_required: ns.attach_required().to_vec(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchPath {
    entries: Mutex<Vec<AttachedPackage>>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoned locks are recovered.
    fn entries(&self) -> MutexGuard<'_, Vec<AttachedPackage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach `package`, first attaching any of `required` that are not on
    /// the path yet. `required` is in dependency order; entries already
    /// attached keep their position. `package` itself always ends up in
    /// front, moved there if it was already attached.
    ///
    /// Returns the packages that were not attached before.
    pub fn attach(&self, package: AttachedPackage, required: Vec<AttachedPackage>) -> Vec<Name> {
        let mut entries = self.entries();
        let mut added = Vec::new();

        for dep in required {
            if dep.name != package.name && !entries.iter().any(|e| e.name == dep.name) {
                added.push(dep.name);
                entries.insert(0, dep);
            }
        }

        match entries.iter().position(|e| e.name == package.name) {
            Some(pos) => {
                let existing = entries.remove(pos);
                entries.insert(0, existing);
            }
            None => {
                added.push(package.name);
                entries.insert(0, package);
            }
        }

        added
    }

    /// Remove a package. Fails while any other attached package still
    /// requires it.
    pub fn detach(&self, name: &str) -> Result<(), RuntimeError> {
        let mut entries = self.entries();

        let pos = entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| RuntimeError::NotAttached {
                package: Name::new(name),
            })?;

        let mut blockers: Vec<Name> = entries
            .iter()
            .filter(|e| e.name != name && e.attach_required.iter().any(|r| *r == name))
            .map(|e| e.name)
            .collect();

        if !blockers.is_empty() {
            blockers.sort();
            return Err(RuntimeError::DetachBlocked {
                package: entries[pos].name,
                blockers,
            });
        }

        entries.remove(pos);
        Ok(())
    }

    /// First attached package exporting `symbol`, front to back.
    pub fn lookup(&self, symbol: &str) -> Result<Arc<Definition>, ResolutionError> {
        self.entries()
            .iter()
            .find_map(|e| e.exports.get(symbol).cloned())
            .ok_or_else(|| ResolutionError::NotFound {
                symbol: symbol.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().iter().any(|e| e.name == name)
    }

    /// Snapshot of the attached package names, front first.
    pub fn packages(&self) -> Vec<Name> {
        self.entries().iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Manifest;
    use semver::Version;

    fn attached(name: &str, exports: &[&str], requires: &[&str]) -> AttachedPackage {
        let manifest = Manifest::new(name, Version::new(1, 0, 0)).exports_all(exports.iter().copied());
        AttachedPackage {
            name: Name::new(name),
            exports: Arc::new(ExportTable::build(&manifest).unwrap()),
            attach_required: requires.iter().map(|r| Name::new(*r)).collect(),
        }
    }

    fn names(path: &SearchPath) -> Vec<&'static str> {
        path.packages().into_iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let path = SearchPath::new();
        path.attach(attached("base", &["dim"], &[]), vec![]);
        path.attach(attached("other", &["dim"], &[]), vec![]);

        assert_eq!(names(&path), vec!["other", "base"]);
        assert_eq!(path.lookup("dim").unwrap().to_string(), "other::dim");
    }

    #[test]
    fn test_reattach_moves_to_front() {
        let path = SearchPath::new();
        path.attach(attached("a", &[], &[]), vec![]);
        path.attach(attached("b", &[], &[]), vec![]);
        let added = path.attach(attached("a", &[], &[]), vec![]);

        assert!(added.is_empty());
        assert_eq!(path.len(), 2);
        assert_eq!(names(&path), vec!["a", "b"]);
    }

    #[test]
    fn test_attach_brings_required_along() {
        let path = SearchPath::new();
        let added = path.attach(
            attached("B", &[], &["A"]),
            vec![attached("A", &[], &[])],
        );

        assert_eq!(added, vec![Name::new("A"), Name::new("B")]);
        assert_eq!(names(&path), vec!["B", "A"]);
    }

    #[test]
    fn test_attached_requirement_keeps_position() {
        let path = SearchPath::new();
        path.attach(attached("A", &[], &[]), vec![]);
        path.attach(attached("x", &[], &[]), vec![]);
        path.attach(attached("B", &[], &["A"]), vec![attached("A", &[], &[])]);

        assert_eq!(names(&path), vec!["B", "x", "A"]);
    }

    #[test]
    fn test_detach_ordering() {
        let path = SearchPath::new();
        path.attach(attached("A", &[], &[]), vec![]);
        path.attach(attached("B", &[], &["A"]), vec![]);

        assert_eq!(
            path.detach("A").unwrap_err(),
            RuntimeError::DetachBlocked {
                package: Name::new("A"),
                blockers: vec![Name::new("B")],
            }
        );
        assert_eq!(path.len(), 2);

        path.detach("B").unwrap();
        path.detach("A").unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_detach_not_attached() {
        let path = SearchPath::new();
        assert!(matches!(
            path.detach("ghost"),
            Err(RuntimeError::NotAttached { .. })
        ));
    }

    #[test]
    fn test_lookup_miss() {
        let path = SearchPath::new();
        path.attach(attached("a", &["f"], &[]), vec![]);
        assert_eq!(
            path.lookup("g").unwrap_err(),
            ResolutionError::NotFound {
                symbol: "g".to_string()
            }
        );
    }

    fn assert_consistent(snapshot: &[&str]) {
        let mut unique = snapshot.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), snapshot.len(), "duplicate entry in {:?}", snapshot);
        if snapshot.contains(&"app") {
            assert!(snapshot.contains(&"lib"), "`lib` detached under `app`: {:?}", snapshot);
        }
    }

    #[test]
    fn test_concurrent_attach_and_detach() {
        let path = SearchPath::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let path = &path;
                s.spawn(move || {
                    for round in 0..50 {
                        match (i + round) % 4 {
                            0 => {
                                path.attach(
                                    attached("app", &["f"], &["lib"]),
                                    vec![attached("lib", &["g"], &[])],
                                );
                            }
                            1 => match path.detach("lib") {
                                Ok(()) | Err(RuntimeError::NotAttached { .. }) => {}
                                Err(RuntimeError::DetachBlocked { blockers, .. }) => {
                                    assert_eq!(blockers, vec![Name::new("app")]);
                                }
                                Err(other) => panic!("unexpected error: {}", other),
                            },
                            2 => {
                                let _ = path.detach("app");
                            }
                            _ => {
                                path.attach(attached("other", &["f"], &[]), vec![]);
                            }
                        }
                        let _ = path.lookup("f");
                        assert_consistent(&names(path));
                    }
                });
            }
        });

        let snapshot = names(&path);
        assert_consistent(&snapshot);
        assert!(snapshot.contains(&"other"));
    }
}
