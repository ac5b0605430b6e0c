//! `mooring tree` command

use anyhow::Result;

use super::load_store;
use crate::cli::TreeArgs;
use mooring::ops::{render_tree, TreeOptions};
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: TreeArgs) -> Result<()> {
    let store = load_store(ctx)?;
    let opts = TreeOptions {
        package: args.package,
        depth: args.depth,
        all_kinds: args.all_kinds,
    };

    print!("{}", render_tree(&store, &opts)?);

    Ok(())
}
