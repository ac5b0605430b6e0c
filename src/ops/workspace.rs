//! Locating and loading the workspace file.

use anyhow::Result;

use crate::core::Workspace;
use crate::util::GlobalContext;

/// Load the workspace named by `--manifest`, or the nearest `Mooring.toml`
/// at or above the working directory.
pub fn load_workspace(ctx: &GlobalContext) -> Result<Workspace> {
    let path = ctx.workspace_file()?;
    Workspace::load(&path)
}
