//! Core data structures.
//!
//! This module contains the foundational types used throughout Mooring:
//! - Interned package and symbol names (via `util::Name`)
//! - Manifests, dependency edges and the manifest store
//! - The package lifecycle state machine
//! - Definitions that symbol lookups resolve to

pub mod definition;
pub mod dependency;
pub mod manifest;
pub mod package;
pub mod store;
pub mod workspace;

pub use definition::{Builtins, Definition, Origin};
pub use dependency::{DepKind, Dependency};
pub use manifest::{ImportDirective, Manifest, SymbolImport};
pub use package::{PackageInfo, PackageState};
pub use store::ManifestStore;
pub use workspace::{find_workspace_file, Workspace, WORKSPACE_FILE};
