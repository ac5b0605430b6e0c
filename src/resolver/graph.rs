//! Dependency graph construction and validation.
//!
//! `build` is a pure function over a manifest store: it validates every
//! edge, rejects cycles through load-order edges, reconciles version
//! constraints against the single installed version of each package, and
//! produces a deterministic load order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::core::{DepKind, ManifestStore};
use crate::resolver::errors::GraphError;
use crate::resolver::plan::LoadPlan;
use crate::resolver::version::VersionConstraint;
use crate::util::Name;

/// Weight of a dependency edge.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub kind: DepKind,
    pub constraint: VersionConstraint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// The full dependency graph, every edge kind included.
///
/// An edge `a -> b` means "a depends on b".
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<Name, DepEdge>,
    nodes: HashMap<Name, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph, rejecting edges to unregistered packages and
    /// self-dependencies.
    pub fn new(store: &ManifestStore) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        // Store iteration is lexical, so node indices follow name order.
        for name in store.names() {
            nodes.insert(name, graph.add_node(name));
        }

        for manifest in store.iter() {
            let from = nodes[&manifest.name()];
            for dep in manifest.dependencies() {
                let Some(&to) = nodes.get(&dep.name()) else {
                    return Err(GraphError::MissingDependency {
                        package: manifest.name(),
                        dependency: dep.name(),
                        kind: dep.kind(),
                    });
                };
                if to == from {
                    return Err(GraphError::SelfDependency {
                        package: manifest.name(),
                    });
                }
                graph.add_edge(
                    from,
                    to,
                    DepEdge {
                        kind: dep.kind(),
                        constraint: dep.constraint().clone(),
                    },
                );
            }
        }

        Ok(DependencyGraph { graph, nodes })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of a package with their kinds, sorted by name.
    pub fn deps(&self, name: &str) -> Vec<(Name, DepKind)> {
        let Some(&node) = self.nodes.get(name) else {
            return Vec::new();
        };

        let mut deps: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (self.graph[e.target()], e.weight().kind))
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }

    /// Packages that depend on the given package, with the edge kind.
    pub fn dependents(&self, name: &str) -> Vec<(Name, DepKind)> {
        let Some(&node) = self.nodes.get(name) else {
            return Vec::new();
        };

        let mut dependents: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (self.graph[e.source()], e.weight().kind))
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// Load-order successors of a node, in name order.
    fn load_successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|e| e.weight().kind.affects_load_order())
            .map(|e| e.target())
            .collect();
        next.sort_by_key(|n| self.graph[*n]);
        next.dedup();
        next
    }

    /// Find a cycle through load-order edges.
    ///
    /// Three-colour depth-first search; a back edge to a gray node closes
    /// a cycle. The returned path starts and ends with the same package.
    pub fn find_cycle(&self) -> Option<Vec<Name>> {
        let mut color = vec![Color::White; self.graph.node_count()];
        let mut path = Vec::new();

        for node in self.graph.node_indices() {
            if color[node.index()] == Color::White {
                if let Some(cycle) = self.visit(node, &mut color, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn visit(
        &self,
        node: NodeIndex,
        color: &mut [Color],
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<Name>> {
        color[node.index()] = Color::Gray;
        path.push(node);

        for next in self.load_successors(node) {
            match color[next.index()] {
                Color::Gray => {
                    let start = path.iter().rposition(|&n| n == next)?;
                    let mut cycle: Vec<Name> =
                        path[start..].iter().map(|&n| self.graph[n]).collect();
                    cycle.push(self.graph[next]);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.visit(next, color, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        color[node.index()] = Color::Black;
        None
    }

    /// Check every package's installed version against all constraints
    /// placed on it.
    fn check_versions(&self, store: &ManifestStore) -> Result<(), GraphError> {
        for target in self.graph.node_indices() {
            let package = self.graph[target];
            let Some(installed) = store.get(&package).map(|m| m.version().clone()) else {
                continue;
            };

            let mut requirements: Vec<(Name, VersionConstraint)> = self
                .graph
                .edges_directed(target, Direction::Incoming)
                .map(|e| (self.graph[e.source()], e.weight().constraint.clone()))
                .collect();
            if requirements.is_empty() {
                continue;
            }
            // Stable sort keeps declaration order within one requirer.
            requirements.sort_by_key(|(requirer, _)| *requirer);
            // One requirer may reach the target through several edge kinds.
            requirements.dedup();

            let combined = requirements
                .iter()
                .fold(VersionConstraint::any(), |acc, (_, c)| acc.intersect(c));

            if combined.is_unsatisfiable() {
                requirements.retain(|(_, c)| !c.is_any());
            } else if !combined.satisfied_by(&installed) {
                requirements.retain(|(_, c)| !c.satisfied_by(&installed));
            } else {
                continue;
            }

            return Err(GraphError::VersionConflict {
                package,
                installed,
                requirements,
            });
        }

        Ok(())
    }

    /// Topological order over load-order edges, dependencies first. Ties
    /// are broken by package name.
    fn load_order(&self) -> (Vec<Name>, BTreeMap<Name, Vec<Name>>) {
        let mut dependencies: BTreeMap<Name, Vec<Name>> = BTreeMap::new();
        let mut remaining: HashMap<NodeIndex, usize> = HashMap::new();
        let mut heap = BinaryHeap::new();

        for node in self.graph.node_indices() {
            let deps = self.load_successors(node);
            remaining.insert(node, deps.len());
            if deps.is_empty() {
                heap.push(Reverse((self.graph[node], node)));
            } else {
                dependencies.insert(self.graph[node], deps.iter().map(|&d| self.graph[d]).collect());
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((name, node))) = heap.pop() {
            order.push(name);

            let mut dependents: Vec<NodeIndex> = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .filter(|e| e.weight().kind.affects_load_order())
                .map(|e| e.source())
                .collect();
            dependents.sort();
            dependents.dedup();

            for dependent in dependents {
                if let Some(count) = remaining.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        heap.push(Reverse((self.graph[dependent], dependent)));
                    }
                }
            }
        }

        (order, dependencies)
    }
}

/// Validate the manifests and compute a load plan.
pub fn build(store: &ManifestStore) -> Result<LoadPlan, GraphError> {
    let graph = DependencyGraph::new(store)?;

    if let Some(cycle) = graph.find_cycle() {
        tracing::debug!("cycle found: {:?}", cycle);
        return Err(GraphError::CyclicDependency { cycle });
    }

    graph.check_versions(store)?;

    let (order, dependencies) = graph.load_order();
    let versions = store
        .iter()
        .map(|m| (m.name(), m.version().clone()))
        .collect();

    tracing::debug!("load order: {:?}", order);
    Ok(LoadPlan::new(order, dependencies, versions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dependency, Manifest};
    use semver::Version;

    fn pkg(name: &str) -> Manifest {
        Manifest::new(name, Version::new(1, 0, 0))
    }

    fn order(plan: &LoadPlan) -> Vec<&str> {
        plan.packages().iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_chain_order() {
        let store: ManifestStore = [
            pkg("a").depends_on("b", DepKind::Required),
            pkg("b").depends_on("c", DepKind::LinkTime),
            pkg("c"),
        ]
        .into_iter()
        .collect();

        let plan = build(&store).unwrap();
        assert_eq!(order(&plan), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let store: ManifestStore = [
            pkg("zeta"),
            pkg("alpha"),
            pkg("mid").depends_on("zeta", DepKind::AttachRequired),
        ]
        .into_iter()
        .collect();

        let plan = build(&store).unwrap();
        assert_eq!(order(&plan), vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_dev_and_optional_edges_do_not_order() {
        let base: Vec<Manifest> = vec![pkg("a"), pkg("b")];
        let plain = build(&base.iter().cloned().collect()).unwrap();

        let with_soft: ManifestStore = [
            pkg("a")
                .depends_on("b", DepKind::RequiredDev)
                .depends_on("b", DepKind::Optional),
            pkg("b"),
        ]
        .into_iter()
        .collect();
        let soft = build(&with_soft).unwrap();

        assert_eq!(order(&plain), order(&soft));
        assert_eq!(order(&soft), vec!["a", "b"]);
    }

    #[test]
    fn test_soft_cycle_is_allowed() {
        let store: ManifestStore = [
            pkg("a").depends_on("b", DepKind::Required),
            pkg("b").depends_on("a", DepKind::Optional),
        ]
        .into_iter()
        .collect();

        assert_eq!(order(&build(&store).unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn test_cycle_names_every_package() {
        let store: ManifestStore = [
            pkg("a").depends_on("b", DepKind::Required),
            pkg("b").depends_on("c", DepKind::AttachRequired),
            pkg("c").depends_on("a", DepKind::LinkTime),
            pkg("d"),
        ]
        .into_iter()
        .collect();

        let err = build(&store).unwrap_err();
        match err {
            GraphError::CyclicDependency { cycle } => {
                let names: Vec<&str> = cycle.iter().map(|n| n.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_found_below_entry() {
        let store: ManifestStore = [
            pkg("app").depends_on("x", DepKind::Required),
            pkg("x").depends_on("y", DepKind::Required),
            pkg("y").depends_on("x", DepKind::Required),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            build(&store).unwrap_err(),
            GraphError::CyclicDependency {
                cycle: vec![Name::new("x"), Name::new("y"), Name::new("x")],
            }
        );
    }

    #[test]
    fn test_missing_dependency() {
        let store: ManifestStore = [pkg("a").depends_on("ghost", DepKind::Optional)]
            .into_iter()
            .collect();

        assert!(matches!(
            build(&store),
            Err(GraphError::MissingDependency { dependency, .. }) if dependency == "ghost"
        ));
    }

    #[test]
    fn test_self_dependency() {
        let store: ManifestStore = [pkg("a").depends_on("a", DepKind::Required)]
            .into_iter()
            .collect();

        assert_eq!(
            build(&store).unwrap_err(),
            GraphError::SelfDependency {
                package: Name::new("a")
            }
        );
    }

    #[test]
    fn test_version_conflict_between_requirers() {
        let at_least_2 = VersionConstraint::parse(">= 2.0").unwrap();
        let below_2 = VersionConstraint::parse(">= 1.0, < 2.0").unwrap();

        let store: ManifestStore = [
            pkg("X").with_dependency(
                Dependency::new("lib", DepKind::Required).with_constraint(at_least_2.clone()),
            ),
            pkg("Y").with_dependency(
                Dependency::new("lib", DepKind::Required).with_constraint(below_2.clone()),
            ),
            Manifest::new("lib", Version::new(2, 1, 0)),
        ]
        .into_iter()
        .collect();

        match build(&store).unwrap_err() {
            GraphError::VersionConflict {
                package,
                requirements,
                ..
            } => {
                assert_eq!(package, "lib");
                assert_eq!(
                    requirements,
                    vec![(Name::new("X"), at_least_2), (Name::new("Y"), below_2)]
                );
            }
            other => panic!("expected version conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_installed_version_too_old() {
        let store: ManifestStore = [
            pkg("app").with_dependency(
                Dependency::new("lib", DepKind::Required)
                    .with_constraint(VersionConstraint::at_least(Version::new(1, 5, 0))),
            ),
            pkg("other").depends_on("lib", DepKind::Required),
            Manifest::new("lib", Version::new(1, 4, 0)),
        ]
        .into_iter()
        .collect();

        match build(&store).unwrap_err() {
            GraphError::VersionConflict { requirements, installed, .. } => {
                assert_eq!(installed, Version::new(1, 4, 0));
                assert_eq!(requirements.len(), 1);
                assert_eq!(requirements[0].0, "app");
            }
            other => panic!("expected version conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_requirer_with_several_edge_kinds_listed_once() {
        let too_new = VersionConstraint::at_least(Version::new(2, 0, 0));
        let store: ManifestStore = [
            pkg("app")
                .with_dependency(
                    Dependency::new("Rcpp", DepKind::Required).with_constraint(too_new.clone()),
                )
                .with_dependency(
                    Dependency::new("Rcpp", DepKind::LinkTime).with_constraint(too_new.clone()),
                ),
            Manifest::new("Rcpp", Version::new(1, 0, 0)),
        ]
        .into_iter()
        .collect();

        match build(&store).unwrap_err() {
            GraphError::VersionConflict { requirements, .. } => {
                assert_eq!(requirements, vec![(Name::new("app"), too_new)]);
            }
            other => panic!("expected version conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_compatible_constraints_pass() {
        let store: ManifestStore = [
            pkg("a").with_dependency(
                Dependency::new("lib", DepKind::Required)
                    .with_constraint(VersionConstraint::parse(">= 1.0").unwrap()),
            ),
            pkg("b").with_dependency(
                Dependency::new("lib", DepKind::Optional)
                    .with_constraint(VersionConstraint::parse("< 3.0").unwrap()),
            ),
            Manifest::new("lib", Version::new(2, 0, 0)),
        ]
        .into_iter()
        .collect();

        assert!(build(&store).is_ok());
    }

    #[test]
    fn test_topological_validity_on_wide_graph() {
        // p{i} depends on every p{j} with j < i and j divides i.
        let manifests: Vec<Manifest> = (1..=24)
            .map(|i| {
                let mut m = pkg(&format!("p{:02}", i));
                for j in 1..i {
                    if i % j == 0 {
                        let kind = DepKind::ALL[(i + j) % DepKind::ALL.len()];
                        m = m.depends_on(format!("p{:02}", j), kind);
                    }
                }
                m
            })
            .collect();
        let store: ManifestStore = manifests.iter().cloned().collect();

        let plan = build(&store).unwrap();
        assert_eq!(plan.len(), 24);
        for manifest in &manifests {
            let pos = plan.position(&manifest.name()).unwrap();
            for dep in manifest.dependencies() {
                if dep.kind().affects_load_order() {
                    assert!(plan.position(&dep.name()).unwrap() < pos);
                }
            }
        }
    }

    #[test]
    fn test_graph_queries() {
        let store: ManifestStore = [
            pkg("app")
                .depends_on("util", DepKind::Required)
                .depends_on("testkit", DepKind::RequiredDev),
            pkg("util").depends_on("base", DepKind::AttachRequired),
            pkg("base"),
            pkg("testkit"),
        ]
        .into_iter()
        .collect();

        let graph = DependencyGraph::new(&store).unwrap();
        assert_eq!(
            graph.deps("app"),
            vec![
                (Name::new("testkit"), DepKind::RequiredDev),
                (Name::new("util"), DepKind::Required)
            ]
        );
        assert_eq!(graph.dependents("base"), vec![(Name::new("util"), DepKind::AttachRequired)]);
    }
}
