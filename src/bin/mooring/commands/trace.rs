//! `mooring trace` command

use anyhow::Result;

use super::load_store;
use crate::cli::TraceArgs;
use mooring::ops::trace_symbol;
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: TraceArgs) -> Result<()> {
    let store = load_store(ctx)?;
    let trace = trace_symbol(store, &ctx.config(), &args.symbol, &args.in_package)?;

    print!("{}", trace.render());

    Ok(())
}
