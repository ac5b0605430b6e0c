//! Test utilities for Mooring unit tests.
//!
//! Manifest fixtures live in `fixtures`; this module adds helpers for
//! tests that need a workspace on disk.

pub mod fixtures;

use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::WORKSPACE_FILE;

// Re-export fixtures for convenience
pub use fixtures::*;

/// A temporary directory holding a `Mooring.toml`.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new(contents: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        std::fs::write(dir.path().join(WORKSPACE_FILE), contents)
            .expect("failed to write workspace file");
        TestWorkspace { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join(WORKSPACE_FILE)
    }
}
