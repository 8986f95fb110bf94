//! In-memory registry implementing both provider contracts

use crate::dependency::Dependency;
use crate::error::{ResolveError, Result};
use crate::package::{Package, PackageId, RemoteLocation};
use crate::provider::{PackageRepository, RemoteRef, VersionProvider};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Packages and remote refs held in maps
///
/// Dependency listings come from each package's declared dependencies.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    packages: HashMap<PackageId, Package>,
    refs: HashMap<String, Vec<RemoteRef>>,
    unavailable: HashSet<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a package
    pub fn add_package(&mut self, package: Package) {
        self.packages.insert(package.id.clone(), package);
    }

    /// Register the refs published by a remote
    pub fn add_refs(&mut self, url: impl Into<String>, refs: Vec<RemoteRef>) {
        self.refs.entry(url.into()).or_default().extend(refs);
    }

    /// Make every query against `url` fail as unreachable
    pub fn mark_unavailable(&mut self, url: impl Into<String>) {
        self.unavailable.insert(url.into());
    }

    pub fn remove_package(&mut self, id: &PackageId) -> Option<Package> {
        self.packages.remove(id)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

#[async_trait]
impl PackageRepository for MemoryRegistry {
    async fn find_package_by_id(&self, id: &PackageId) -> Result<Package> {
        self.packages
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(id.as_str()))
    }

    async fn find_dependencies_for_package(&self, id: &PackageId) -> Result<Vec<Dependency>> {
        self.packages
            .get(id)
            .map(|p| p.declared_dependencies.clone())
            .ok_or_else(|| ResolveError::not_found(id.as_str()))
    }
}

#[async_trait]
impl VersionProvider for MemoryRegistry {
    async fn list_refs(&self, remote: &RemoteLocation) -> Result<Vec<RemoteRef>> {
        if self.unavailable.contains(&remote.url) {
            return Err(ResolveError::SourceUnavailable {
                remote: remote.url.clone(),
                reason: "remote unreachable".to_string(),
            });
        }

        Ok(self.refs.get(&remote.url).cloned().unwrap_or_default())
    }
}
