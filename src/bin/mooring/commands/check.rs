//! `mooring check` command

use anyhow::Result;

use super::load_store;
use mooring::ops::{check, format_check};
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let store = load_store(ctx)?;
    let report = check(&store, &ctx.config())?;

    print!("{}", format_check(&report));
    if ctx.is_verbose() {
        println!("plan fingerprint: {}", report.fingerprint);
    }

    Ok(())
}
