//! Dependency resolution engine
//!
//! Walks the dependency graph of a root package depth-first, picks a version
//! for every edge, and turns the result into a [`ResolutionPlan`]: what to
//! install, in which order, and which version conflicts were found.

use crate::dependency::Dependency;
use crate::error::{ResolveError, Result, ValidationError};
use crate::install_order::InstallOrderComputer;
use crate::package::{Package, PackageId};
use crate::provider::{PackageRepository, VersionProvider};
use crate::validator::Validator;
use crate::version::{PackageVersion, VersionConstraint};
use futures::future::{BoxFuture, FutureExt};
use lattice_config::settings::DEFAULT_MAX_DEPTH;
use lattice_config::ResolverSettings;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod conflict;
mod cycles;
mod tree;
mod version_solver;

pub use conflict::{ConflictDetector, ConflictSeverity, DependencyConflict};
pub use tree::DependencyTree;
pub use version_solver::{sort_by_priority, VersionResolution, VersionSolver};

/// Knobs for a single resolution run
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Follow edges that are not required (development and optional)
    pub include_dev_dependencies: bool,
    /// Deepest level the walk may reach before failing
    pub max_depth: usize,
    /// Checked before every step of the walk
    pub cancellation: Option<CancellationToken>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            include_dev_dependencies: false,
            max_depth: DEFAULT_MAX_DEPTH,
            cancellation: None,
        }
    }
}

impl ResolveOptions {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl From<&ResolverSettings> for ResolveOptions {
    fn from(settings: &ResolverSettings) -> Self {
        Self {
            include_dev_dependencies: settings.include_dev_dependencies,
            max_depth: settings.max_depth,
            cancellation: None,
        }
    }
}

/// A package the plan installs, with the edge that first reached it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDependency {
    /// The edge, in the `resolved` state
    pub dependency: Dependency,
    pub resolved_package: Package,
    pub resolved_version: PackageVersion,
    pub is_direct_dependency: bool,
    /// Distance from the root; direct dependencies are at depth 0
    pub depth: usize,
    /// False when no version matched and the best available one was taken
    pub satisfies_constraint: bool,
}

/// Output of a resolution run
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionPlan {
    pub root_package: Package,
    pub resolved_dependencies: Vec<ResolvedDependency>,
    /// Every package after the packages it depends on
    pub installation_order: Vec<PackageId>,
    /// Layers that can be installed in parallel, in order
    pub installation_groups: Vec<Vec<PackageId>>,
    pub conflicts: Vec<DependencyConflict>,
    /// Cycles that prevented a strict installation order
    pub ordering_cycles: Vec<Vec<PackageId>>,
    /// Resolved dependencies plus the root
    pub total_packages: usize,
    pub resolution_time_ms: u64,
}

impl ResolutionPlan {
    /// Whether any conflict must be fixed before installing
    pub fn has_blocking_conflicts(&self) -> bool {
        self.conflicts.iter().any(DependencyConflict::is_blocking)
    }

    /// Look up the resolution of a package
    pub fn resolved(&self, id: &PackageId) -> Option<&ResolvedDependency> {
        self.resolved_dependencies
            .iter()
            .find(|r| &r.resolved_package.id == id)
    }

    /// Generate a human-readable summary
    pub fn report(&self) -> String {
        let mut report = format!(
            "Resolved {} ({} packages in {}ms)\n",
            self.root_package.id, self.total_packages, self.resolution_time_ms
        );

        report.push_str("\nInstallation order:\n");
        for (index, id) in self.installation_order.iter().enumerate() {
            let version = self
                .resolved(id)
                .map(|r| r.resolved_version.to_string())
                .unwrap_or_default();
            report.push_str(&format!("  {}. {} {}\n", index + 1, id, version));
        }

        for cycle in &self.ordering_cycles {
            let path: Vec<&str> = cycle.iter().map(PackageId::as_str).collect();
            report.push_str(&format!("\nCycle: {}\n", path.join(" -> ")));
        }

        for conflict in &self.conflicts {
            report.push('\n');
            report.push_str(&conflict.report());
        }

        report
    }
}

/// Per-run accumulators, dropped when the run ends
#[derive(Default)]
struct WalkState {
    visited: HashSet<PackageId>,
    recorded: HashSet<PackageId>,
    version_map: BTreeMap<PackageId, Vec<PackageVersion>>,
    resolved: Vec<ResolvedDependency>,
    edges: Vec<Dependency>,
}

/// Resolves dependency graphs against a package repository
///
/// The resolver holds no state between runs; every call builds its own
/// accumulators, so one instance can serve any number of resolutions.
pub struct DependencyResolver<R, V> {
    repository: R,
    versions: V,
    solver: VersionSolver,
}

impl<R, V> DependencyResolver<R, V>
where
    R: PackageRepository,
    V: VersionProvider,
{
    pub fn new(repository: R, versions: V) -> Self {
        Self {
            repository,
            versions,
            solver: VersionSolver::new(),
        }
    }

    /// Replace the branch names treated as installable versions
    pub fn with_live_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solver = VersionSolver::with_live_branches(branches);
        self
    }

    /// Apply the `[resolver]` section of `lattice.toml`
    pub fn with_settings(self, settings: &ResolverSettings) -> Self {
        self.with_live_branches(settings.live_branches.iter().cloned())
    }

    /// Resolve the full transitive dependency set of `root`
    ///
    /// The walk is fail-fast: a missing package, an unreachable source or an
    /// exceeded depth aborts the run. Version conflicts are reported in the
    /// plan instead.
    #[tracing::instrument(skip_all, fields(root = %root.id))]
    pub async fn resolve_dependencies_for_package(
        &self,
        root: &Package,
        options: &ResolveOptions,
    ) -> Result<ResolutionPlan> {
        let start = Instant::now();
        let mut state = WalkState::default();

        self.walk(root.clone(), 0, options, &mut state).await?;

        let conflicts = ConflictDetector::detect(&state.version_map, &state.edges);

        let computer = InstallOrderComputer::new(&root.id, &state.edges);
        let order = computer.compute();
        let installation_groups = computer.parallel_install_groups();

        let total_packages = state.resolved.len() + 1;
        let resolution_time_ms = start.elapsed().as_millis() as u64;

        info!(
            packages = total_packages,
            conflicts = conflicts.len(),
            elapsed_ms = resolution_time_ms,
            "dependency resolution complete"
        );

        Ok(ResolutionPlan {
            root_package: root.clone(),
            resolved_dependencies: state.resolved,
            installation_order: order.order,
            installation_groups,
            conflicts,
            ordering_cycles: order.cycles,
            total_packages,
            resolution_time_ms,
        })
    }

    fn walk<'a>(
        &'a self,
        package: Package,
        depth: usize,
        options: &'a ResolveOptions,
        state: &'a mut WalkState,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            if options.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }

            if depth > options.max_depth {
                return Err(ValidationError::DepthExceeded {
                    package: package.id.to_string(),
                    depth,
                    max_depth: options.max_depth,
                }
                .into());
            }

            if !state.visited.insert(package.id.clone()) {
                return Ok(());
            }

            let dependencies = self
                .repository
                .find_dependencies_for_package(&package.id)
                .await?;

            for dependency in dependencies {
                if !dependency.is_required() && !options.include_dev_dependencies {
                    debug!(edge = %dependency, kind = %dependency.dependency_type(), "skipping non-required dependency");
                    continue;
                }

                let target = self
                    .repository
                    .find_package_by_id(dependency.target())
                    .await
                    .map_err(|err| with_requested_constraint(err, dependency.constraint()))?;

                let resolution = self.resolve_version(&target, dependency.constraint()).await?;
                let version = resolution.best_version;

                if !resolution.satisfies_constraint {
                    warn!(
                        edge = %dependency,
                        selected = %version,
                        "no version satisfies constraint, using best available"
                    );
                } else {
                    debug!(edge = %dependency, selected = %version, depth, "resolved dependency");
                }

                let edge = dependency.resolving()?.resolved(version.clone())?;

                state
                    .version_map
                    .entry(target.id.clone())
                    .or_default()
                    .push(version.clone());
                state.edges.push(edge.clone());

                if !state.visited.contains(&target.id) && state.recorded.insert(target.id.clone()) {
                    state.resolved.push(ResolvedDependency {
                        dependency: edge,
                        resolved_package: target.clone(),
                        resolved_version: version,
                        is_direct_dependency: depth == 0,
                        depth,
                        satisfies_constraint: resolution.satisfies_constraint,
                    });
                }

                self.walk(target, depth + 1, options, state).await?;
            }

            Ok(())
        }
        .boxed()
    }

    async fn resolve_version(
        &self,
        target: &Package,
        constraint: &VersionConstraint,
    ) -> Result<VersionResolution> {
        match target.source.remote() {
            None => Ok(VersionSolver::resolve_local(target, constraint)),
            Some(remote) => {
                self.solver
                    .resolve_version_constraint(&self.versions, &target.id, remote, constraint)
                    .await
            }
        }
    }

    /// Check that two packages agree on every platform version both declare
    pub fn validate_dependency_compatibility(first: &Package, second: &Package) -> Result<()> {
        Validator::validate_dependency_compatibility(first, second)?;
        Ok(())
    }
}

/// Attach the edge's constraint to a bare not-found error
fn with_requested_constraint(err: ResolveError, constraint: &VersionConstraint) -> ResolveError {
    match err {
        ResolveError::PackageNotFound {
            package,
            constraint: None,
        } => ResolveError::PackageNotFound {
            package,
            constraint: Some(constraint.to_string()),
        },
        other => other,
    }
}
