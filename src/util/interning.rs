//! Interned names for packages and symbols.
//!
//! Package names and symbol names are compared and hashed constantly during
//! graph building and lookup. `Name` stores a pointer into a process-wide
//! interner, so equality is a pointer comparison and copies are free.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NAMES: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

fn intern(s: &str) -> &'static str {
    if let Some(&existing) = NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(s)
    {
        return existing;
    }

    let mut names = NAMES.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(&existing) = names.get(s) {
        return existing;
    }

    let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
    names.insert(leaked);
    leaked
}

/// Whether `s` has been interned by anything in this process.
#[cfg(test)]
pub(crate) fn is_interned(s: &str) -> bool {
    NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(s)
}

/// An interned package or symbol name.
///
/// Ordering is lexical on the string content, which is what the load
/// planner relies on for deterministic tie-breaking.
#[derive(Clone, Copy)]
pub struct Name(&'static str);

impl Name {
    pub fn new(s: impl AsRef<str>) -> Self {
        Name(intern(s.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.0
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Name {}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(other.0)
    }
}

// Hash the content rather than the pointer so that `Borrow<str>` lookups in
// hash maps agree with `str`'s own hash.
impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

impl From<&String> for Name {
    fn from(s: &String) -> Self {
        Name::new(s)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Name::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn test_same_content_same_pointer() {
        let a = Name::new("dim");
        let b = Name::new(String::from("dim"));

        assert_eq!(a, b);
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
        assert_ne!(a, Name::new("nrow"));
    }

    #[test]
    fn test_is_interned() {
        assert!(!is_interned("interning_test_fresh_name"));
        Name::new("interning_test_fresh_name");
        assert!(is_interned("interning_test_fresh_name"));
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Name::new("base"), 1);

        assert_eq!(map.get("base"), Some(&1));
    }

    #[test]
    fn test_lexical_ordering() {
        let set: BTreeSet<Name> = ["util", "base", "other"].into_iter().map(Name::new).collect();
        let ordered: Vec<&str> = set.iter().map(|n| n.as_str()).collect();

        assert_eq!(ordered, vec!["base", "other", "util"]);
    }
}
