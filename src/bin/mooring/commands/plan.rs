//! `mooring plan` command

use anyhow::Result;

use super::load_store;
use crate::cli::PlanArgs;
use mooring::ops::{format_plan, plan};
use mooring::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: PlanArgs) -> Result<()> {
    let store = load_store(ctx)?;
    let report = plan(&store)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_plan(&report));
    }

    Ok(())
}
