//! `mooring explain` command

use anyhow::Result;

use super::load_store;
use crate::cli::ExplainArgs;
use mooring::ops::{explain, format_explanation};
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: ExplainArgs) -> Result<()> {
    let store = load_store(ctx)?;
    let explanation = explain(&store, &ctx.config(), &args.package)?;

    print!("{}", format_explanation(&explanation));

    Ok(())
}
