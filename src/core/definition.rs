//! Definitions that symbol references resolve to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::util::Name;

/// Where a definition lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "package", rename_all = "lowercase")]
pub enum Origin {
    Package(Name),
    Builtin,
}

/// A definition: the thing a resolved symbol refers to.
///
/// `calls` lists the free symbols the definition's body references. They
/// are resolved in the defining package's own namespace, never on the
/// search path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub origin: Origin,
    pub symbol: Name,
    pub calls: Vec<Name>,
    pub exported: bool,
}

impl Definition {
    pub fn new(package: Name, symbol: Name, calls: Vec<Name>, exported: bool) -> Self {
        Definition {
            origin: Origin::Package(package),
            symbol,
            calls,
            exported,
        }
    }

    pub fn builtin(symbol: Name) -> Self {
        Definition {
            origin: Origin::Builtin,
            symbol,
            calls: Vec::new(),
            exported: true,
        }
    }

    /// The defining package, or `None` for a built-in.
    pub fn package(&self) -> Option<Name> {
        match self.origin {
            Origin::Package(name) => Some(name),
            Origin::Builtin => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == Origin::Builtin
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Origin::Package(pkg) => write!(f, "{}::{}", pkg, self.symbol),
            Origin::Builtin => write!(f, "<builtin>::{}", self.symbol),
        }
    }
}

/// The core definitions visible to every package's own code.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    defs: BTreeMap<Name, Arc<Definition>>,
}

impl Builtins {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let defs = names
            .into_iter()
            .map(|s| {
                let name = Name::new(s);
                (name, Arc::new(Definition::builtin(name)))
            })
            .collect();

        Builtins { defs }
    }

    pub fn get(&self, symbol: &str) -> Option<&Arc<Definition>> {
        self.defs.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.defs.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let def = Definition::new(Name::new("base"), Name::new("dim"), vec![], true);
        assert_eq!(def.to_string(), "base::dim");
        assert_eq!(def.package(), Some(Name::new("base")));

        let builtin = Definition::builtin(Name::new("length"));
        assert_eq!(builtin.to_string(), "<builtin>::length");
        assert!(builtin.is_builtin());
        assert_eq!(builtin.package(), None);
    }

    #[test]
    fn test_builtins_lookup() {
        let builtins = Builtins::new(["sum", "length"]);

        assert_eq!(builtins.len(), 2);
        assert!(builtins.contains("sum"));
        assert!(builtins.get("dim").is_none());
        assert!(builtins.get("length").unwrap().is_builtin());
    }
}
