//! Dependency graph errors and their diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use semver::Version;
use thiserror::Error;

use crate::core::DepKind;
use crate::resolver::version::VersionConstraint;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::Name;

/// Error while building the dependency graph or load plan.
///
/// Building is fail-fast: the first error found is returned and no
/// partial plan is ever exposed.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum GraphError {
    #[error("package `{package}` depends on `{dependency}`, which is not registered")]
    #[diagnostic(code(mooring::graph::missing_dependency))]
    MissingDependency {
        package: Name,
        dependency: Name,
        kind: DepKind,
    },

    #[error("package `{package}` depends on itself")]
    #[diagnostic(code(mooring::graph::self_dependency))]
    SelfDependency { package: Name },

    #[error("cyclic dependency: {}", format_cycle(.cycle))]
    #[diagnostic(
        code(mooring::graph::cycle),
        help("break the cycle by moving one edge to `suggests` or restructuring the packages")
    )]
    CyclicDependency {
        /// The packages on the cycle, first package repeated at the end.
        cycle: Vec<Name>,
    },

    #[error("version conflict for `{package}` v{installed}: {}", format_requirements(.requirements))]
    #[diagnostic(code(mooring::graph::version_conflict))]
    VersionConflict {
        package: Name,
        installed: Version,
        /// (requirer, constraint) pairs in requirer order.
        requirements: Vec<(Name, VersionConstraint)>,
    },
}

fn format_cycle(cycle: &[Name]) -> String {
    cycle
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_requirements(requirements: &[(Name, VersionConstraint)]) -> String {
    requirements
        .iter()
        .map(|(requirer, constraint)| format!("`{}` requires {}", requirer, constraint))
        .collect::<Vec<_>>()
        .join(", ")
}

impl GraphError {
    /// Packages named by the error, for front ends that highlight them.
    pub fn packages(&self) -> Vec<Name> {
        match self {
            GraphError::MissingDependency {
                package,
                dependency,
                ..
            } => vec![*package, *dependency],
            GraphError::SelfDependency { package } => vec![*package],
            GraphError::CyclicDependency { cycle } => {
                let mut names = cycle.clone();
                names.pop();
                names
            }
            GraphError::VersionConflict {
                package,
                requirements,
                ..
            } => std::iter::once(*package)
                .chain(requirements.iter().map(|(r, _)| *r))
                .collect(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::MissingDependency {
                package,
                dependency,
                kind,
            } => Diagnostic::error(format!("could not find package `{}`", dependency))
                .with_context(format!(
                    "`{}` declares it as a {} dependency ({})",
                    package,
                    kind,
                    kind.field_name()
                ))
                .with_suggestion(format!("Add a `[packages.{}]` entry", dependency))
                .with_suggestion("Check that the package name is spelled correctly"),

            GraphError::SelfDependency { package } => {
                Diagnostic::error(format!("package `{}` depends on itself", package))
                    .with_suggestion(format!(
                        "Remove `{}` from its own dependencies",
                        package
                    ))
            }

            GraphError::CyclicDependency { cycle } => {
                Diagnostic::error("cycle detected in dependency graph")
                    .with_context(format!("cycle: {}", format_cycle(cycle)))
                    .with_suggestion(
                        "Break the cycle by moving one edge to `suggests` or restructuring the packages",
                    )
                    .with_suggestion(suggestions::SHOW_TREE)
            }

            GraphError::VersionConflict {
                package,
                installed,
                requirements,
            } => {
                let mut diag = Diagnostic::error(format!("version conflict for `{}`", package))
                    .with_context(format!("installed: {} v{}", package, installed));

                for (requirer, constraint) in requirements {
                    diag = diag.with_context(format!(
                        "`{}` requires {} {}",
                        requirer, package, constraint
                    ));
                }

                diag.with_suggestion(format!(
                    "Relax the requirements on `{}` so one version satisfies them all",
                    package
                ))
                .with_suggestion(format!(
                    "Install a version of `{}` inside every requirement",
                    package
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let err = GraphError::CyclicDependency {
            cycle: vec![Name::new("a"), Name::new("b"), Name::new("a")],
        };

        assert_eq!(err.to_string(), "cyclic dependency: a -> b -> a");
        assert_eq!(err.packages(), vec![Name::new("a"), Name::new("b")]);
        assert!(err.to_diagnostic().format(false).contains("cycle: a -> b -> a"));
    }

    #[test]
    fn test_version_conflict_diagnostic() {
        let err = GraphError::VersionConflict {
            package: Name::new("lib"),
            installed: Version::new(2, 1, 0),
            requirements: vec![
                (Name::new("X"), VersionConstraint::at_least(Version::new(2, 0, 0))),
                (
                    Name::new("Y"),
                    VersionConstraint::between(Version::new(1, 0, 0), Version::new(2, 0, 0)),
                ),
            ],
        };

        assert!(err.to_string().contains("`X` requires >=2.0.0"));

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("version conflict for `lib`"));
        assert!(output.contains("installed: lib v2.1.0"));
        assert!(output.contains("`Y` requires lib >=1.0.0, <2.0.0"));
    }

    #[test]
    fn test_missing_dependency_diagnostic() {
        let err = GraphError::MissingDependency {
            package: Name::new("app"),
            dependency: Name::new("ghost"),
            kind: DepKind::LinkTime,
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("could not find package `ghost`"));
        assert!(output.contains("link-time dependency (LinkingTo)"));
    }
}
