//! `resolve` and `trace`: one-shot engine sessions over a workspace.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::{Definition, ManifestStore};
use crate::runtime::{CallTrace, Context, Engine};
use crate::util::{Config, Name};
use crate::Error;

/// A symbol reference as typed by the user: `sym` or `pkg::sym`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub package: Option<Name>,
    pub symbol: Name,
}

impl Reference {
    pub fn parse(text: &str) -> Self {
        match text.split_once("::") {
            Some((pkg, sym)) if !pkg.is_empty() && !sym.is_empty() => Reference {
                package: Some(Name::new(pkg)),
                symbol: Name::new(sym),
            },
            _ => Reference {
                package: None,
                symbol: Name::new(text),
            },
        }
    }

    /// `pkg::sym` is qualified; otherwise inside `in_package` if given,
    /// else top level.
    pub fn context(&self, in_package: Option<&str>) -> Context {
        match (self.package, in_package) {
            (Some(pkg), _) => Context::Qualified(pkg),
            (None, Some(pkg)) => Context::Internal(Name::new(pkg)),
            (None, None) => Context::TopLevel,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.package {
            Some(pkg) => write!(f, "{}::{}", pkg, self.symbol),
            None => write!(f, "{}", self.symbol),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub symbol: String,
    /// Resolve as code inside this package.
    pub in_package: Option<String>,
    /// Packages to attach, in order, before resolving.
    pub attach: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub reference: String,
    pub context: String,
    pub definition: Arc<Definition>,
    /// Search path after the attach sequence, front first.
    pub search_path: Vec<Name>,
}

/// Load everything, run the attach sequence, then resolve one reference.
pub fn resolve_symbol(
    store: ManifestStore,
    config: &Config,
    opts: &ResolveOptions,
) -> Result<Resolution, Error> {
    let engine = start_engine(store, config)?;
    for name in &opts.attach {
        engine.attach(name)?;
    }

    let reference = Reference::parse(&opts.symbol);
    if reference.package.is_some() && opts.in_package.is_some() {
        tracing::warn!("`{}` is qualified; ignoring --in", reference);
    }
    let context = reference.context(opts.in_package.as_deref());
    let definition = engine.resolve(&reference.symbol, context)?;

    let resolution = Resolution {
        reference: reference.to_string(),
        context: context.to_string(),
        definition,
        search_path: engine.search_path(),
    };
    engine.shutdown();
    Ok(resolution)
}

pub fn format_resolution(resolution: &Resolution) -> String {
    format!(
        "{} {} -> {}\n",
        resolution.reference, resolution.context, resolution.definition
    )
}

/// Trace the calls made by `symbol` as seen from `in_package`.
pub fn trace_symbol(
    store: ManifestStore,
    config: &Config,
    symbol: &str,
    in_package: &str,
) -> Result<CallTrace, Error> {
    let engine = start_engine(store, config)?;
    let reference = Reference::parse(symbol);
    let context = reference.context(Some(in_package));
    Ok(engine.trace(&reference.symbol, context)?)
}

fn start_engine(store: ManifestStore, config: &Config) -> Result<Engine, Error> {
    let mut engine = Engine::with_store(config, store);
    engine.load()?;
    Ok(engine)
}
