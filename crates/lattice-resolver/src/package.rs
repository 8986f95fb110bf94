//! Package identity, sources and manifests

use crate::dependency::Dependency;
use crate::error::ValidationError;
use crate::validator::Validator;
use crate::version::PackageVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Validated package identifier
///
/// Stored trimmed; equality, hashing and ordering use that normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: &str) -> Result<Self, ValidationError> {
        Validator::validate_package_id(id)?;
        Ok(Self(id.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PackageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PackageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PackageId> for String {
    fn from(id: PackageId) -> Self {
        id.0
    }
}

impl AsRef<str> for PackageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Location of a remote whose refs can be enumerated as versions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteLocation {
    pub url: String,
}

impl RemoteLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Where a package comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageSource {
    /// A checkout on disk; only the manifest version is available
    Local { path: PathBuf },
    Git { remote: RemoteLocation },
    Registry { remote: RemoteLocation },
}

impl PackageSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        PackageSource::Local { path: path.into() }
    }

    pub fn git(url: impl Into<String>) -> Self {
        PackageSource::Git {
            remote: RemoteLocation::new(url),
        }
    }

    pub fn registry(url: impl Into<String>) -> Self {
        PackageSource::Registry {
            remote: RemoteLocation::new(url),
        }
    }

    /// The remote to enumerate versions from, if any
    pub fn remote(&self) -> Option<&RemoteLocation> {
        match self {
            PackageSource::Local { .. } => None,
            PackageSource::Git { remote } | PackageSource::Registry { remote } => Some(remote),
        }
    }
}

/// Manifest metadata consumed by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub version: PackageVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Minimum platform version per dimension, e.g. `runtime = "1.4.0"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub platform_requirements: BTreeMap<String, PackageVersion>,
}

impl PackageManifest {
    pub fn new(version: PackageVersion) -> Self {
        Self {
            version,
            description: None,
            authors: Vec::new(),
            license: None,
            platform_requirements: BTreeMap::new(),
        }
    }

    pub fn with_platform_requirement(
        mut self,
        dimension: impl Into<String>,
        version: PackageVersion,
    ) -> Self {
        self.platform_requirements.insert(dimension.into(), version);
        self
    }
}

/// A node in the dependency graph
///
/// Two packages are the same node iff their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PackageRecord")]
pub struct Package {
    pub id: PackageId,
    pub source: PackageSource,
    pub manifest: PackageManifest,
    #[serde(default)]
    pub declared_dependencies: Vec<Dependency>,
}

#[derive(Deserialize)]
struct PackageRecord {
    id: PackageId,
    source: PackageSource,
    manifest: PackageManifest,
    #[serde(default)]
    declared_dependencies: Vec<Dependency>,
}

impl TryFrom<PackageRecord> for Package {
    type Error = ValidationError;

    fn try_from(record: PackageRecord) -> Result<Self, Self::Error> {
        Package::new(record.id, record.manifest, record.source)
            .with_dependencies(record.declared_dependencies)
    }
}

impl Package {
    pub fn new(id: PackageId, manifest: PackageManifest, source: PackageSource) -> Self {
        Self {
            id,
            source,
            manifest,
            declared_dependencies: Vec::new(),
        }
    }

    /// Attach declared dependencies; each must originate from this package
    pub fn with_dependencies(
        mut self,
        dependencies: Vec<Dependency>,
    ) -> Result<Self, ValidationError> {
        if let Some(foreign) = dependencies.iter().find(|d| d.source() != &self.id) {
            return Err(ValidationError::ForeignDependency {
                owner: self.id.to_string(),
                declared_by: foreign.source().to_string(),
                target: foreign.target().to_string(),
            });
        }
        self.declared_dependencies = dependencies;
        Ok(self)
    }

    /// Version declared in the manifest
    pub fn version(&self) -> &PackageVersion {
        &self.manifest.version
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Package {}
