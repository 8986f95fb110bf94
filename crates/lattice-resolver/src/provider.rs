//! Contracts for the collaborators the resolver reads from
//!
//! The resolver never talks to storage or transports directly. Package
//! lookups go through a [`PackageRepository`] and remote version listings
//! through a [`VersionProvider`], so tests can plug in in-memory fakes.

use crate::dependency::Dependency;
use crate::error::Result;
use crate::package::{Package, PackageId, RemoteLocation};
use async_trait::async_trait;

/// Looks up packages and their declared dependency edges
#[async_trait]
pub trait PackageRepository: Send + Sync {
    /// Return the package aggregate, or [`ResolveError::PackageNotFound`]
    ///
    /// [`ResolveError::PackageNotFound`]: crate::ResolveError::PackageNotFound
    async fn find_package_by_id(&self, id: &PackageId) -> Result<Package>;

    /// Return the dependency edges declared by `id`
    async fn find_dependencies_for_package(&self, id: &PackageId) -> Result<Vec<Dependency>>;
}

/// Kind of a remote ref
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Tag,
    Branch,
}

/// A tag or branch on a remote, mapped to the version it publishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub kind: RefKind,
    pub version: String,
}

impl RemoteRef {
    /// A tag whose name is the version, with an optional leading `v`
    pub fn tag(name: impl Into<String>) -> Self {
        let name = name.into();
        let version = name.strip_prefix('v').unwrap_or(&name).to_string();
        Self {
            name,
            kind: RefKind::Tag,
            version,
        }
    }

    pub fn branch(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Branch,
            version: version.into(),
        }
    }
}

/// Enumerates the refs of a remote package source
#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// List tags and branches, or fail with
    /// [`ResolveError::SourceUnavailable`] when the remote cannot be queried
    ///
    /// [`ResolveError::SourceUnavailable`]: crate::ResolveError::SourceUnavailable
    async fn list_refs(&self, remote: &RemoteLocation) -> Result<Vec<RemoteRef>>;
}

#[async_trait]
impl<T: PackageRepository + ?Sized> PackageRepository for &T {
    async fn find_package_by_id(&self, id: &PackageId) -> Result<Package> {
        (**self).find_package_by_id(id).await
    }

    async fn find_dependencies_for_package(&self, id: &PackageId) -> Result<Vec<Dependency>> {
        (**self).find_dependencies_for_package(id).await
    }
}

#[async_trait]
impl<T: VersionProvider + ?Sized> VersionProvider for &T {
    async fn list_refs(&self, remote: &RemoteLocation) -> Result<Vec<RemoteRef>> {
        (**self).list_refs(remote).await
    }
}
