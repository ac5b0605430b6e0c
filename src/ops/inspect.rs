//! `tree` and `explain`: read-only views of the dependency graph.

use std::collections::HashSet;
use std::fmt::Write;

use semver::Version;
use serde::Serialize;

use crate::core::{DepKind, ManifestStore};
use crate::namespace::NamespaceRegistry;
use crate::resolver::{self, DependencyGraph};
use crate::runtime::RuntimeError;
use crate::util::{Config, Name};
use crate::Error;

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Root package; all top-level packages when `None`.
    pub package: Option<String>,
    pub depth: Option<usize>,
    /// Include dev and optional edges.
    pub all_kinds: bool,
}

/// Render the dependency tree. Packages already printed are marked `(*)`
/// and not expanded again.
pub fn render_tree(store: &ManifestStore, opts: &TreeOptions) -> Result<String, Error> {
    let graph = DependencyGraph::new(store)?;
    let shown = |kind: DepKind| opts.all_kinds || kind.affects_load_order();

    let roots: Vec<Name> = match &opts.package {
        Some(name) => {
            if !store.contains(name) {
                return Err(RuntimeError::UnknownPackage {
                    package: name.clone(),
                }
                .into());
            }
            vec![Name::new(name)]
        }
        None => {
            let top: Vec<Name> = store
                .names()
                .filter(|n| !graph.dependents(n).iter().any(|(_, kind)| shown(*kind)))
                .collect();
            if top.is_empty() {
                store.names().collect()
            } else {
                top
            }
        }
    };

    let max_depth = opts.depth.unwrap_or(usize::MAX);
    let mut output = String::new();
    let mut seen = HashSet::new();
    for root in roots {
        print_tree(&mut output, store, &graph, root, None, 0, max_depth, &mut seen, &shown);
    }
    Ok(output)
}

#[allow(clippy::too_many_arguments)]
fn print_tree(
    output: &mut String,
    store: &ManifestStore,
    graph: &DependencyGraph,
    name: Name,
    kind: Option<DepKind>,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<Name>,
    shown: &dyn Fn(DepKind) -> bool,
) {
    if depth > max_depth {
        return;
    }

    let is_duplicate = !seen.insert(name);

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let version = store
        .get(&name)
        .map(|m| format!(" v{}", m.version()))
        .unwrap_or_default();
    let kind_label = match kind {
        Some(DepKind::Required) | None => String::new(),
        Some(kind) => format!(" [{}]", kind),
    };
    let deps: Vec<(Name, DepKind)> = graph
        .deps(&name)
        .into_iter()
        .filter(|(_, kind)| shown(*kind))
        .collect();
    let dup_marker = if is_duplicate && !deps.is_empty() { " (*)" } else { "" };

    writeln!(output, "{}{}{}{}{}", prefix, name, version, kind_label, dup_marker).unwrap();

    if is_duplicate {
        return;
    }

    for (dep, kind) in deps {
        print_tree(output, store, graph, dep, Some(kind), depth + 1, max_depth, seen, shown);
    }
}

/// Everything known about one package.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub name: Name,
    pub version: Version,
    pub dependencies: Vec<(Name, DepKind)>,
    pub dependents: Vec<(Name, DepKind)>,
    /// Position in the load order, when the workspace plans cleanly.
    pub load_position: Option<usize>,
    pub exports: Vec<Name>,
    /// `local <- from::symbol`
    pub imports: Vec<String>,
}

pub fn explain(store: &ManifestStore, config: &Config, name: &str) -> Result<Explanation, Error> {
    let manifest = store.get(name).ok_or_else(|| RuntimeError::UnknownPackage {
        package: name.to_string(),
    })?;
    let graph = DependencyGraph::new(store)?;

    let mut explanation = Explanation {
        name: manifest.name(),
        version: manifest.version().clone(),
        dependencies: graph.deps(name),
        dependents: graph.dependents(name),
        load_position: None,
        exports: manifest.exports().to_vec(),
        imports: Vec::new(),
    };

    let plan = resolver::build(store)?;
    explanation.load_position = plan.position(name);

    let registry = if config.engine.parallel_build {
        NamespaceRegistry::build_parallel(&plan, store)?
    } else {
        NamespaceRegistry::build(&plan, store)?
    };
    if let Some(ns) = registry.get(name) {
        explanation.exports = ns.exports().names().collect();
        explanation.imports = ns
            .imports()
            .iter()
            .map(|b| format!("{} <- {}::{}", b.local, b.from, b.symbol))
            .collect();
    }

    Ok(explanation)
}

pub fn format_explanation(explanation: &Explanation) -> String {
    let mut output = String::new();

    writeln!(output, "{} v{}", explanation.name, explanation.version).unwrap();
    if let Some(pos) = explanation.load_position {
        writeln!(output, "  load position: {}", pos + 1).unwrap();
    }

    writeln!(output, "\nDepends on:").unwrap();
    if explanation.dependencies.is_empty() {
        writeln!(output, "  (nothing)").unwrap();
    }
    for (dep, kind) in &explanation.dependencies {
        writeln!(output, "  {} ({}, {})", dep, kind, kind.field_name()).unwrap();
    }

    writeln!(output, "\nRequired by:").unwrap();
    if explanation.dependents.is_empty() {
        writeln!(output, "  (nothing)").unwrap();
    }
    for (dep, kind) in &explanation.dependents {
        writeln!(output, "  {} ({})", dep, kind).unwrap();
    }

    if !explanation.exports.is_empty() {
        let exports: Vec<&str> = explanation.exports.iter().map(|e| e.as_str()).collect();
        writeln!(output, "\nExports: {}", exports.join(", ")).unwrap();
    }
    if !explanation.imports.is_empty() {
        writeln!(output, "\nImports:").unwrap();
        for import in &explanation.imports {
            writeln!(output, "  {}", import).unwrap();
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{capture_scenario, pkg};

    #[test]
    fn test_tree_whole_workspace() {
        let text = render_tree(&capture_scenario(), &TreeOptions::default()).unwrap();
        assert_eq!(
            text,
            "other v1.0.0\nutil v1.0.0\n├── base v1.0.0 [attach-required]\n"
        );
    }

    #[test]
    fn test_tree_kinds_and_depth() {
        let store: ManifestStore = [
            pkg("a").depends_on("b", DepKind::Required).depends_on("t", DepKind::RequiredDev),
            pkg("b").depends_on("c", DepKind::LinkTime),
            pkg("c"),
            pkg("t"),
        ]
        .into_iter()
        .collect();

        let default = render_tree(&store, &TreeOptions::default()).unwrap();
        assert!(!default.contains("t v1.0.0\n├"));
        assert!(default.contains("│   ├── c v1.0.0 [link-time]"));

        let all = render_tree(
            &store,
            &TreeOptions {
                package: Some("a".into()),
                depth: Some(1),
                all_kinds: true,
            },
        )
        .unwrap();
        assert_eq!(all, "a v1.0.0\n├── b v1.0.0\n├── t v1.0.0 [required-dev]\n");
    }

    #[test]
    fn test_tree_marks_repeats() {
        let store: ManifestStore = [
            pkg("a").depends_on("c", DepKind::Required),
            pkg("b").depends_on("c", DepKind::Required),
            pkg("c").depends_on("d", DepKind::Required),
            pkg("d"),
        ]
        .into_iter()
        .collect();

        let text = render_tree(&store, &TreeOptions::default()).unwrap();
        assert!(text.contains("b v1.0.0\n├── c v1.0.0 (*)\n"));
    }

    #[test]
    fn test_tree_unknown_root() {
        let opts = TreeOptions {
            package: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(render_tree(&capture_scenario(), &opts).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_explain() {
        let explanation = explain(&capture_scenario(), &Config::default(), "util").unwrap();
        assert_eq!(explanation.load_position, Some(2));
        assert_eq!(
            explanation.dependencies,
            vec![(Name::new("base"), DepKind::AttachRequired)]
        );
        assert_eq!(explanation.imports, vec!["dim <- base::dim".to_string()]);

        let text = format_explanation(&explanation);
        assert!(text.contains("base (attach-required, Depends)"));
        assert!(text.contains("Exports: nrow"));

        let base = explain(&capture_scenario(), &Config::default(), "base").unwrap();
        assert_eq!(
            base.dependents,
            vec![(Name::new("util"), DepKind::AttachRequired)]
        );
    }
}
