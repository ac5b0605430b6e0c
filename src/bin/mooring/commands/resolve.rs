//! `mooring resolve` command

use anyhow::Result;

use super::load_store;
use crate::cli::ResolveArgs;
use mooring::ops::{format_resolution, resolve_symbol, ResolveOptions};
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: ResolveArgs) -> Result<()> {
    let store = load_store(ctx)?;
    let opts = ResolveOptions {
        symbol: args.symbol,
        in_package: args.in_package,
        attach: args.attach,
    };

    let resolution = resolve_symbol(store, &ctx.config(), &opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    print!("{}", format_resolution(&resolution));
    if ctx.is_verbose() && !resolution.search_path.is_empty() {
        let path: Vec<&str> = resolution.search_path.iter().map(|n| n.as_str()).collect();
        println!("search path: {}", path.join(" > "));
    }

    Ok(())
}
