//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Mooring - package dependency and namespace resolution
#[derive(Parser)]
#[command(name = "mooring")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the workspace file (defaults to the nearest Mooring.toml)
    #[arg(long, global = true, env = "MOORING_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate dependencies and print the load order
    Plan(PlanArgs),

    /// Build every namespace and report the first error
    Check,

    /// Resolve a symbol reference
    Resolve(ResolveArgs),

    /// Show which definitions a symbol's body calls, recursively
    Trace(TraceArgs),

    /// Display the dependency tree
    Tree(TreeArgs),

    /// Show a package's dependencies, dependents and namespace
    Explain(ExplainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Symbol to resolve; `pkg::sym` resolves against pkg's exports
    pub symbol: String,

    /// Resolve as code inside this package
    #[arg(long = "in", value_name = "PKG")]
    pub in_package: Option<String>,

    /// Attach a package before resolving (repeatable, applied in order)
    #[arg(long, value_name = "PKG")]
    pub attach: Vec<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TraceArgs {
    /// Symbol to trace
    pub symbol: String,

    /// Package whose code makes the call
    #[arg(long = "in", value_name = "PKG")]
    pub in_package: String,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Package to show tree for (defaults to every top-level package)
    pub package: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Include dev and optional dependencies
    #[arg(long)]
    pub all_kinds: bool,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Package to explain
    pub package: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
