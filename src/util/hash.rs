//! Fingerprinting for load plans.

use sha2::{Digest, Sha256};

/// Incrementally builds a SHA-256 fingerprint from string components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a component. Components are NUL-separated so `("ab", "c")`
    /// and `("a", "bc")` hash differently.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Mark the end of a variable-length group.
    pub fn end_group(&mut self) -> &mut Self {
        self.hasher.update(b"\x1e");
        self
    }

    /// Finish and return the hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
