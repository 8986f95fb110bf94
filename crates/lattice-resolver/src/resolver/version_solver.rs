//! Picks a concrete version for a single dependency edge

use crate::error::{ResolveError, Result};
use crate::package::{Package, PackageId, RemoteLocation};
use crate::provider::{RefKind, RemoteRef, VersionProvider};
use crate::version::{PackageVersion, VersionConstraint};
use chrono::{DateTime, Utc};
use lattice_config::settings::DEFAULT_LIVE_BRANCHES;
use serde::Serialize;
use tracing::debug;

/// Outcome of resolving one constraint against a package's versions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionResolution {
    pub best_version: PackageVersion,
    /// Candidates in priority order: releases first, each group descending
    pub available_versions: Vec<PackageVersion>,
    /// False when no candidate matched and the top candidate was used anyway
    pub satisfies_constraint: bool,
    pub resolved_at: DateTime<Utc>,
}

/// Version solver over tags and live branches
#[derive(Debug, Clone)]
pub struct VersionSolver {
    live_branches: Vec<String>,
}

impl VersionSolver {
    pub fn new() -> Self {
        Self::with_live_branches(DEFAULT_LIVE_BRANCHES.iter().map(|b| b.to_string()))
    }

    pub fn with_live_branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            live_branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    pub fn live_branches(&self) -> &[String] {
        &self.live_branches
    }

    /// Enumerate the remote and pick the best version for `constraint`
    pub async fn resolve_version_constraint<V: VersionProvider + ?Sized>(
        &self,
        provider: &V,
        package: &PackageId,
        remote: &RemoteLocation,
        constraint: &VersionConstraint,
    ) -> Result<VersionResolution> {
        let refs = provider.list_refs(remote).await?;
        let available = self.available_versions(&refs);
        Self::select(package, constraint, available)
    }

    /// A local source has exactly one version: the one in its manifest
    pub fn resolve_local(package: &Package, constraint: &VersionConstraint) -> VersionResolution {
        let version = package.version().clone();
        VersionResolution {
            satisfies_constraint: constraint.matches(&version),
            available_versions: vec![version.clone()],
            best_version: version,
            resolved_at: Utc::now(),
        }
    }

    /// Parse tags and live branches into a sorted, de-duplicated candidate list
    pub fn available_versions(&self, refs: &[RemoteRef]) -> Vec<PackageVersion> {
        let mut versions: Vec<PackageVersion> = refs
            .iter()
            .filter(|r| match r.kind {
                RefKind::Tag => true,
                RefKind::Branch => self.live_branches.iter().any(|b| b == &r.name),
            })
            .filter_map(|r| match PackageVersion::parse(&r.version) {
                Ok(version) => Some(version),
                Err(_) => {
                    debug!(reference = %r.name, version = %r.version, "ignoring unparseable ref");
                    None
                }
            })
            .collect();

        sort_by_priority(&mut versions);
        versions.dedup();
        versions
    }

    /// Choose among candidates already in priority order
    pub fn select(
        package: &PackageId,
        constraint: &VersionConstraint,
        available: Vec<PackageVersion>,
    ) -> Result<VersionResolution> {
        let Some(first) = available.first().cloned() else {
            return Err(ResolveError::PackageNotFound {
                package: package.to_string(),
                constraint: Some(constraint.to_string()),
            });
        };

        let satisfying: Vec<&PackageVersion> =
            available.iter().filter(|v| constraint.matches(v)).collect();

        let best = if constraint.prefers_release() {
            // Priority order already puts releases ahead of prereleases
            satisfying.first().map(|v| (*v).clone())
        } else {
            satisfying.iter().max().map(|v| (*v).clone())
        };

        let (best_version, satisfies_constraint) = match best {
            Some(version) => (version, true),
            None => (first, false),
        };

        Ok(VersionResolution {
            best_version,
            available_versions: available,
            satisfies_constraint,
            resolved_at: Utc::now(),
        })
    }
}

impl Default for VersionSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases before prereleases, highest first within each group
pub fn sort_by_priority(versions: &mut [PackageVersion]) {
    versions.sort_by(|a, b| {
        a.is_prerelease()
            .cmp(&b.is_prerelease())
            .then_with(|| b.cmp(a))
    });
}
