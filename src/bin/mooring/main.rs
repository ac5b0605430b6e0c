//! Mooring CLI - dependency and namespace resolution for package workspaces

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mooring::core::workspace::WorkspaceFileError;
use mooring::util::diagnostic::{emit, suggestions};
use mooring::util::{Diagnostic, GlobalContext};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let mut ctx = match GlobalContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);
    ctx.set_manifest_path(cli.manifest.clone());

    // `--no-color` or `[output] color = false` in a config file.
    let color = ctx.config().output.color;
    ctx.set_color(color);

    // Set up logging
    let default_filter = if cli.verbose {
        "mooring=debug"
    } else {
        "mooring=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(&ctx, cli.command) {
        let workspace = ctx.workspace_file().ok();
        std::process::exit(report(&e, color, workspace.as_deref()));
    }
}

fn run(ctx: &GlobalContext, command: Commands) -> Result<()> {
    match command {
        Commands::Plan(args) => commands::plan::execute(ctx, args),
        Commands::Check => commands::check::execute(ctx),
        Commands::Resolve(args) => commands::resolve::execute(ctx, args),
        Commands::Trace(args) => commands::trace::execute(ctx, args),
        Commands::Tree(args) => commands::tree::execute(ctx, args),
        Commands::Explain(args) => commands::explain::execute(ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error and return the exit code for it.
///
/// Validation errors point at the workspace file they came from.
fn report(err: &anyhow::Error, color: bool, workspace: Option<&Path>) -> i32 {
    if let Some(engine_err) = err.downcast_ref::<mooring::Error>() {
        let mut diag = engine_err.to_diagnostic();
        if let (1, Some(path)) = (engine_err.exit_code(), workspace) {
            diag = diag.with_location(path);
        }
        emit(&diag, color);
        return engine_err.exit_code();
    }

    if let Some(ws_err) = err.downcast_ref::<WorkspaceFileError>() {
        let WorkspaceFileError::NotFound { dir } = ws_err;
        let diag = Diagnostic::error(ws_err.to_string())
            .with_location(dir)
            .with_suggestion(suggestions::NO_WORKSPACE);
        emit(&diag, color);
        return 1;
    }

    eprintln!("error: {:#}", err);
    1
}
