//! Command implementations

pub mod check;
pub mod completions;
pub mod explain;
pub mod plan;
pub mod resolve;
pub mod trace;
pub mod tree;

use anyhow::Result;

use mooring::core::ManifestStore;
use mooring::ops::load_workspace;
use mooring::util::GlobalContext;

/// Load the workspace file and hand back its manifests.
fn load_store(ctx: &GlobalContext) -> Result<ManifestStore> {
    Ok(load_workspace(ctx)?.into_store())
}
