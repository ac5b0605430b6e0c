//! High-level operations.
//!
//! This module contains the implementation of Mooring commands.

pub mod inspect;
pub mod plan;
pub mod session;
pub mod workspace;

pub use inspect::{explain, format_explanation, render_tree, Explanation, TreeOptions};
pub use plan::{check, format_check, format_plan, plan, CheckReport, PlanEntry, PlanReport};
pub use session::{
    format_resolution, resolve_symbol, trace_symbol, Reference, Resolution, ResolveOptions,
};
pub use workspace::load_workspace;
